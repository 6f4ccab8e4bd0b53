use std::collections::BTreeMap;

use crate::error::{Result, SummarizeError};

use super::ModelSpec;

pub const BART_LARGE_CNN: &str = "facebook/bart-large-cnn";
pub const T5_SMALL: &str = "t5-small";

/// Explicit model id -> capability mapping. Unknown ids are rejected.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: BTreeMap<String, ModelSpec>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ModelSpec::new(BART_LARGE_CNN, 1024));
        registry.register(ModelSpec::new(T5_SMALL, 512));
        registry
    }
}

impl ModelRegistry {
    pub fn empty() -> Self {
        Self {
            models: BTreeMap::new(),
        }
    }

    /// Add or replace an entry.
    pub fn register(&mut self, spec: ModelSpec) {
        self.models.insert(spec.id.clone(), spec);
    }

    pub fn resolve(&self, model_id: &str) -> Result<&ModelSpec> {
        self.models
            .get(model_id)
            .ok_or_else(|| SummarizeError::UnknownModel(model_id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.values()
    }
}
