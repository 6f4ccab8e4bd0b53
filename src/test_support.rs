// In-crate doubles for the model boundary.
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Result, SummarizeError};
use crate::model::{LengthBounds, ModelProvider, ModelSpec, SummarizationModel, TextGenerator, TextTokenizer};

pub const SPECIAL_TOKEN: u32 = 0;
/// Literal marker that encodes to `SPECIAL_TOKEN`.
pub const SPECIAL_MARKER: &str = "</s>";

/// Whitespace tokenizer: one id per word, id 0 reserved as a special token.
#[derive(Default)]
pub struct WordTokenizer {
    vocab: Mutex<(HashMap<String, u32>, Vec<String>)>,
}

impl TextTokenizer for WordTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let mut vocab = self.vocab.lock();
        let (ids, words) = &mut *vocab;
        Ok(text
            .split_whitespace()
            .map(|w| {
                if w == SPECIAL_MARKER {
                    return SPECIAL_TOKEN;
                }
                *ids.entry(w.to_string()).or_insert_with(|| {
                    words.push(w.to_string());
                    words.len() as u32
                })
            })
            .collect())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        let vocab = self.vocab.lock();
        Ok(ids
            .iter()
            .filter(|&&id| id != SPECIAL_TOKEN)
            .filter_map(|&id| vocab.1.get(id as usize - 1).cloned())
            .collect::<Vec<_>>()
            .join(" "))
    }
}

/// Tokenizer that fails in `encode` or in `decode`.
pub enum BrokenTokenizer {
    Encode,
    Decode,
}

impl TextTokenizer for BrokenTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        match self {
            BrokenTokenizer::Encode => Err(SummarizeError::Tokenizer("vocabulary not loaded".to_string())),
            BrokenTokenizer::Decode => Ok(text.split_whitespace().map(|_| 1).collect()),
        }
    }

    fn decode(&self, _ids: &[u32]) -> Result<String> {
        Err(SummarizeError::Tokenizer("unknown id".to_string()))
    }
}

type GenerateFn = dyn Fn(&str, LengthBounds) -> Result<String> + Send + Sync;

pub struct MockModel {
    tokenizer: Box<dyn TextTokenizer + Send + Sync>,
    generate: Box<GenerateFn>,
    calls: Mutex<Vec<String>>,
}

impl MockModel {
    pub fn new(generate: impl Fn(&str, LengthBounds) -> Result<String> + Send + Sync + 'static) -> Self {
        Self::with_tokenizer(WordTokenizer::default(), generate)
    }

    pub fn with_tokenizer(
        tokenizer: impl TextTokenizer + Send + Sync + 'static,
        generate: impl Fn(&str, LengthBounds) -> Result<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            tokenizer: Box::new(tokenizer),
            generate: Box::new(generate),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Inputs passed to `generate`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl TextTokenizer for MockModel {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        self.tokenizer.encode(text)
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.tokenizer.decode(ids)
    }
}

impl TextGenerator for MockModel {
    fn generate(&self, text: &str, bounds: LengthBounds) -> Result<String> {
        self.calls.lock().push(text.to_string());
        (self.generate)(text, bounds)
    }
}

pub struct MockProvider {
    model: Arc<MockModel>,
    loads: AtomicUsize,
}

impl MockProvider {
    pub fn new(model: MockModel) -> Self {
        Self {
            model: Arc::new(model),
            loads: AtomicUsize::new(0),
        }
    }

    /// Generator that returns its input unchanged.
    pub fn echo() -> Self {
        Self::new(MockModel::new(|text, _| Ok(text.to_string())))
    }

    pub fn model(&self) -> &MockModel {
        &self.model
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ModelProvider for MockProvider {
    fn load(&self, _spec: &ModelSpec) -> Result<Arc<dyn SummarizationModel>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let model: Arc<dyn SummarizationModel> = self.model.clone();
        Ok(model)
    }
}
