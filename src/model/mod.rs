// Model boundary: tokenizer + generation pipeline behind small traits so the
// chunk-and-combine core never touches HTTP or tokenizer files directly.
pub mod cache;
pub mod hf;
pub mod registry;

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use cache::CachedProvider;
pub use hf::HfInferenceProvider;
pub use registry::ModelRegistry;

/// Capability record for one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub id: String,
    /// Maximum number of input tokens the model accepts in one call.
    pub context_limit: usize,
    /// Local `tokenizer.json`; when absent the tokenizer is fetched by id.
    #[serde(default)]
    pub tokenizer: Option<PathBuf>,
}

impl ModelSpec {
    pub fn new(id: impl Into<String>, context_limit: usize) -> Self {
        Self {
            id: id.into(),
            context_limit,
            tokenizer: None,
        }
    }
}

/// Output length bounds handed to the generator as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LengthBounds {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for LengthBounds {
    fn default() -> Self {
        Self {
            min_length: 60,
            max_length: 180,
        }
    }
}

pub trait TextTokenizer {
    /// Encode without adding model-specific special tokens.
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    /// Decode, dropping special tokens.
    fn decode(&self, ids: &[u32]) -> Result<String>;
}

pub trait TextGenerator {
    /// Run the summarization pipeline once on `text`.
    fn generate(&self, text: &str, bounds: LengthBounds) -> Result<String>;
}

/// A loaded model. Implementations must be safe for concurrent read-only use.
pub trait SummarizationModel: TextTokenizer + TextGenerator + Send + Sync {}

impl<T: TextTokenizer + TextGenerator + Send + Sync> SummarizationModel for T {}

pub trait ModelProvider: Send + Sync {
    fn load(&self, spec: &ModelSpec) -> Result<Arc<dyn SummarizationModel>>;
}
