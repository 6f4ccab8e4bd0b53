use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::hf::DEFAULT_INFERENCE_URL;
use crate::model::{ModelRegistry, ModelSpec};
use crate::nlp::{check_budget_ratio, DEFAULT_BUDGET_RATIO};
use crate::summarizer::SummaryParams;

/// Settings loaded from a TOML file; every field has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the summarization inference endpoint; the model id is appended.
    pub inference_url: String,

    /// Environment variable holding the bearer token for the endpoint
    pub token_env: String,

    /// Per-request timeout. Unset means a call blocks until the model answers.
    pub request_timeout_secs: Option<u64>,

    /// Share of the model context limit used per chunk
    pub budget_ratio: f64,

    /// Number of loaded models kept in memory; 0 reloads on every call.
    pub cache_capacity: usize,

    pub defaults: SummaryParams,

    /// Extra or overriding registry entries
    pub models: Vec<ModelSpec>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            token_env: "HF_TOKEN".to_string(),
            request_timeout_secs: None,
            budget_ratio: DEFAULT_BUDGET_RATIO,
            cache_capacity: 2,
            defaults: SummaryParams::default(),
            models: Vec::new(),
        }
    }
}

impl Settings {
    /// `<config dir>/voltsum/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("voltsum").join("config.toml"))
    }

    /// Load from `path`, or from the default location when it exists.
    /// Falls back to defaults when no file is found; an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => {
                    debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        debug!(?config_path, "loading config");
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config: {}", config_path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", config_path.display()))?;
        check_budget_ratio(settings.budget_ratio)
            .with_context(|| format!("invalid config: {}", config_path.display()))?;
        Ok(settings)
    }

    pub fn registry(&self) -> ModelRegistry {
        let mut registry = ModelRegistry::default();
        for spec in &self.models {
            registry.register(spec.clone());
        }
        registry
    }

    pub fn api_token(&self) -> Option<String> {
        std::env::var(&self.token_env).ok().filter(|t| !t.is_empty())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
