// NLP building blocks for voltsum
pub mod abstractive;
pub mod chunker;
pub mod extractive;
pub mod porter;
pub mod rouge;

pub use abstractive::{
    check_budget_ratio, combine, summarize_chunk, summarize_long_text, token_budget, DEFAULT_BUDGET_RATIO,
};
pub use chunker::chunk_text;
pub use extractive::extractive_summary;
pub use rouge::{RougeScore, RougeScorer, RougeScores};
