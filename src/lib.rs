//! voltsum: abstractive and extractive summarization of text and PDF files,
//! plus ROUGE evaluation of the results.
//!
//! Long documents are summarized abstractively by splitting them into token
//! windows that fit the model context, summarizing each window, and
//! re-summarizing the joined partials once.

pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod nlp;
pub mod scoring;
pub mod summarizer;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Result, SummarizeError};
pub use summarizer::{Mode, Summarizer, SummaryParams};
