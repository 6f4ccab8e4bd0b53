use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::model::registry::BART_LARGE_CNN;
use crate::model::{LengthBounds, ModelProvider, ModelRegistry};
use crate::nlp::{check_budget_ratio, extractive_summary, summarize_long_text, token_budget, DEFAULT_BUDGET_RATIO};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Abstractive,
    Extractive,
}

impl Mode {
    /// Exactly `"extractive"` selects extraction; every other name falls
    /// through to abstractive.
    pub fn from_name(name: &str) -> Self {
        if name == "extractive" {
            Mode::Extractive
        } else {
            Mode::Abstractive
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryParams {
    pub model: String,
    #[serde(flatten)]
    pub bounds: LengthBounds,
    /// Sentence count for extractive mode.
    pub sentences: usize,
}

impl Default for SummaryParams {
    fn default() -> Self {
        Self {
            model: BART_LARGE_CNN.to_string(),
            bounds: LengthBounds::default(),
            sentences: 4,
        }
    }
}

/// Entry point for both summarization modes. Owns the token budget policy.
pub struct Summarizer {
    provider: Arc<dyn ModelProvider>,
    registry: ModelRegistry,
    budget_ratio: f64,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn ModelProvider>, registry: ModelRegistry) -> Self {
        Self {
            provider,
            registry,
            budget_ratio: DEFAULT_BUDGET_RATIO,
        }
    }

    /// Fails unless `ratio` is in `(0, 1]`.
    pub fn with_budget_ratio(mut self, ratio: f64) -> Result<Self> {
        self.budget_ratio = check_budget_ratio(ratio)?;
        Ok(self)
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn summarize(&self, text: &str, mode: Mode, params: &SummaryParams) -> Result<String> {
        match mode {
            Mode::Extractive => Ok(self.extractive(text, params.sentences)),
            Mode::Abstractive => self.abstractive(text, &params.model, params.bounds),
        }
    }

    pub fn abstractive(&self, text: &str, model_id: &str, bounds: LengthBounds) -> Result<String> {
        let spec = self.registry.resolve(model_id)?;
        let budget = token_budget(spec.context_limit, self.budget_ratio);
        info!(model = %spec.id, context_limit = spec.context_limit, budget = budget.get(), "abstractive summary");

        let model = self.provider.load(spec)?;
        summarize_long_text(model.as_ref(), text, budget, bounds)
    }

    pub fn extractive(&self, text: &str, sentences: usize) -> String {
        info!(sentences, "extractive summary");
        extractive_summary(text, sentences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SummarizeError;
    use crate::model::ModelSpec;
    use crate::test_support::{MockModel, MockProvider};
    use crate::nlp::extractive::split_sentences;

    fn summarizer_with(provider: Arc<MockProvider>) -> Summarizer {
        let mut registry = ModelRegistry::default();
        registry.register(ModelSpec::new("tiny", 5));
        Summarizer::new(provider, registry)
    }

    #[test]
    fn test_mode_from_name_is_exact() {
        assert_eq!(Mode::from_name("extractive"), Mode::Extractive);
        assert_eq!(Mode::from_name("abstractive"), Mode::Abstractive);
        assert_eq!(Mode::from_name("Extractive"), Mode::Abstractive);
        assert_eq!(Mode::from_name(""), Mode::Abstractive);
    }

    #[test]
    fn test_extractive_dispatch_counts_sentences() {
        let provider = Arc::new(MockProvider::echo());
        let summarizer = summarizer_with(provider.clone());
        let params = SummaryParams {
            sentences: 2,
            ..Default::default()
        };
        let text = "Solar panels convert sunlight into power. Panels need sunlight. \
                    Wind turbines convert wind into power. Batteries store power from panels.";
        let out = summarizer.summarize(text, Mode::Extractive, &params).unwrap();
        assert_eq!(split_sentences(&out).len(), 2);

        let out = summarizer.summarize("Just one.", Mode::Extractive, &params).unwrap();
        assert_eq!(out, "Just one.");
        // extraction never touches the model
        assert_eq!(provider.loads(), 0);
    }

    #[test]
    fn test_abstractive_uses_registry_budget() {
        // context 5 at 0.9 -> 4 tokens per chunk
        let provider = Arc::new(MockProvider::new(MockModel::new(|t, _| Ok(t.to_string()))));
        let summarizer = summarizer_with(provider.clone());
        let params = SummaryParams {
            model: "tiny".to_string(),
            ..Default::default()
        };
        let out = summarizer
            .summarize("one two three four five six", Mode::Abstractive, &params)
            .unwrap();
        assert_eq!(
            provider.model().calls(),
            vec!["one two three four", "five six", "one two three four five six"]
        );
        assert_eq!(out, "one two three four five six");
        assert_eq!(provider.loads(), 1);
    }

    #[test]
    fn test_budget_ratio_is_tunable() {
        let provider = Arc::new(MockProvider::echo());
        let summarizer = summarizer_with(provider.clone()).with_budget_ratio(0.4).unwrap();
        summarizer
            .abstractive("a b c", "tiny", LengthBounds::default())
            .unwrap();
        // 5 * 0.4 = 2 tokens per chunk
        assert_eq!(provider.model().calls(), vec!["a b", "c", "a b c"]);
    }

    #[test]
    fn test_budget_ratio_outside_unit_range_is_rejected() {
        for ratio in [1.5, 0.0, f64::NAN] {
            let err = summarizer_with(Arc::new(MockProvider::echo()))
                .with_budget_ratio(ratio)
                .err()
                .expect("ratio should be rejected");
            assert!(matches!(err, SummarizeError::InvalidBudgetRatio(_)));
        }
    }

    #[test]
    fn test_unknown_model_fails_before_loading() {
        let provider = Arc::new(MockProvider::echo());
        let summarizer = summarizer_with(provider.clone());
        let err = summarizer
            .abstractive("text", "facebook/bart-large-xsum", LengthBounds::default())
            .unwrap_err();
        assert!(matches!(err, SummarizeError::UnknownModel(_)));
        assert_eq!(provider.loads(), 0);
    }

    #[test]
    fn test_default_params() {
        let params = SummaryParams::default();
        assert_eq!(params.model, BART_LARGE_CNN);
        assert_eq!(params.bounds.min_length, 60);
        assert_eq!(params.bounds.max_length, 180);
        assert_eq!(params.sentences, 4);
    }
}
