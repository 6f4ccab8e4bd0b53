use thiserror::Error;

/// Errors raised while loading models, reading inputs or summarizing.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("budget ratio must be in (0, 1], got {0}")]
    InvalidBudgetRatio(f64),

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("inference request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("unexpected inference response: {0}")]
    UnexpectedResponse(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SummarizeError>;
