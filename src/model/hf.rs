// HuggingFace-backed models: `tokenizers` for encode/decode and a hosted
// summarization pipeline for generation.
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::error::{Result, SummarizeError};

use super::{LengthBounds, ModelProvider, ModelSpec, SummarizationModel, TextGenerator, TextTokenizer};

pub const DEFAULT_INFERENCE_URL: &str = "https://router.huggingface.co/hf-inference/models";

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    inputs: &'a str,
    parameters: LengthBounds,
}

#[derive(Deserialize)]
struct GeneratedSummary {
    summary_text: String,
}

pub struct HfInferenceProvider {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HfInferenceProvider {
    /// `timeout` of `None` lets a generation call block until the endpoint answers.
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn load_tokenizer(spec: &ModelSpec) -> Result<Tokenizer> {
        let tokenizer = match &spec.tokenizer {
            Some(path) => {
                debug!(model = %spec.id, path = %path.display(), "loading local tokenizer");
                Tokenizer::from_file(path)
            }
            None => {
                debug!(model = %spec.id, "fetching tokenizer from hub");
                Tokenizer::from_pretrained(&spec.id, None)
            }
        };
        tokenizer.map_err(|e| SummarizeError::Tokenizer(e.to_string()))
    }
}

impl ModelProvider for HfInferenceProvider {
    fn load(&self, spec: &ModelSpec) -> Result<Arc<dyn SummarizationModel>> {
        let tokenizer = Self::load_tokenizer(spec)?;
        info!(model = %spec.id, "model loaded");
        Ok(Arc::new(HfModel {
            tokenizer,
            client: self.client.clone(),
            endpoint: format!("{}/{}", self.base_url, spec.id),
            token: self.token.clone(),
        }))
    }
}

pub struct HfModel {
    tokenizer: Tokenizer,
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl TextTokenizer for HfModel {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| SummarizeError::Tokenizer(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.tokenizer
            .decode(ids, true)
            .map_err(|e| SummarizeError::Tokenizer(e.to_string()))
    }
}

impl TextGenerator for HfModel {
    fn generate(&self, text: &str, bounds: LengthBounds) -> Result<String> {
        let mut request = self.client.post(&self.endpoint).json(&SummarizeRequest {
            inputs: text,
            parameters: bounds,
        });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(SummarizeError::Api {
                status: status.as_u16(),
                body,
            });
        }
        parse_summary(&body)
    }
}

fn parse_summary(body: &str) -> Result<String> {
    let outputs: Vec<GeneratedSummary> = serde_json::from_str(body)
        .map_err(|e| SummarizeError::UnexpectedResponse(format!("{e}: {body}")))?;
    outputs
        .into_iter()
        .next()
        .map(|o| o.summary_text)
        .ok_or_else(|| SummarizeError::UnexpectedResponse("empty output list".to_string()))
}
