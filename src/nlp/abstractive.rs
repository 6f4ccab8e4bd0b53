// Abstractive summarization over bounded-context models: chunk the document,
// summarize each chunk, then reduce the partials with one more pass.
use std::num::NonZeroUsize;

use tracing::{debug, info};

use crate::error::{Result, SummarizeError};
use crate::model::{LengthBounds, SummarizationModel, TextGenerator};

use super::chunker::chunk_text;

/// Share of the context limit handed to the chunker.
pub const DEFAULT_BUDGET_RATIO: f64 = 0.9;

/// Accept a share of the context limit in `(0, 1]`. Larger ratios overflow
/// the model; zero or NaN would degrade to one-token chunks.
pub fn check_budget_ratio(ratio: f64) -> Result<f64> {
    if ratio > 0.0 && ratio <= 1.0 {
        Ok(ratio)
    } else {
        Err(SummarizeError::InvalidBudgetRatio(ratio))
    }
}

/// `floor(context_limit * ratio)`, never below one token.
pub fn token_budget(context_limit: usize, ratio: f64) -> NonZeroUsize {
    let budget = (context_limit as f64 * ratio).floor() as usize;
    NonZeroUsize::new(budget).unwrap_or(NonZeroUsize::MIN)
}

/// One generation call on a single chunk, trimmed.
pub fn summarize_chunk<G>(generator: &G, chunk: &str, bounds: LengthBounds) -> Result<String>
where
    G: TextGenerator + ?Sized,
{
    Ok(generator.generate(chunk, bounds)?.trim().to_string())
}

/// Reduce partial summaries. A single partial is returned as-is; several are
/// joined with spaces and passed through `resummarize` exactly once.
pub fn combine<F>(partials: Vec<String>, resummarize: F) -> Result<String>
where
    F: FnOnce(&str) -> Result<String>,
{
    let joined = partials.join(" ");
    if partials.len() > 1 {
        resummarize(&joined)
    } else {
        Ok(joined)
    }
}

/// Chunk, map and reduce `text` with an already loaded model.
pub fn summarize_long_text(
    model: &dyn SummarizationModel,
    text: &str,
    budget: NonZeroUsize,
    bounds: LengthBounds,
) -> Result<String> {
    let chunks = chunk_text(model, text, budget)?;
    info!(chunks = chunks.len(), budget = budget.get(), "document chunked");

    let mut partials = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let partial = summarize_chunk(model, chunk, bounds)?;
        debug!(chunk = i, chars = partial.len(), "partial summary");
        partials.push(partial);
    }

    combine(partials, |joined| {
        info!(chars = joined.len(), "re-summarizing combined partials");
        summarize_chunk(model, joined, bounds)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{BrokenTokenizer, MockModel, WordTokenizer, SPECIAL_MARKER};
    use std::cell::Cell;

    fn bounds() -> LengthBounds {
        LengthBounds::default()
    }

    #[test]
    fn test_token_budget_floors() {
        assert_eq!(token_budget(1024, DEFAULT_BUDGET_RATIO).get(), 921);
        assert_eq!(token_budget(512, DEFAULT_BUDGET_RATIO).get(), 460);
        assert_eq!(token_budget(10, 0.5).get(), 5);
    }

    #[test]
    fn test_token_budget_never_zero() {
        assert_eq!(token_budget(1, 0.5).get(), 1);
        assert_eq!(token_budget(0, DEFAULT_BUDGET_RATIO).get(), 1);
    }

    #[test]
    fn test_budget_ratio_range() {
        assert_eq!(check_budget_ratio(0.9).unwrap(), 0.9);
        assert_eq!(check_budget_ratio(1.0).unwrap(), 1.0);
        for bad in [0.0, -0.5, 1.5, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                check_budget_ratio(bad),
                Err(SummarizeError::InvalidBudgetRatio(_))
            ));
        }
    }

    #[test]
    fn test_combine_single_partial_skips_resummarize() {
        let called = Cell::new(false);
        let out = combine(vec!["Hello world.".to_string()], |_| {
            called.set(true);
            Ok(String::new())
        })
        .unwrap();
        assert_eq!(out, "Hello world.");
        assert!(!called.get());
    }

    #[test]
    fn test_combine_joins_and_resummarizes_once() {
        let calls = Cell::new(0);
        let out = combine(vec!["A.".to_string(), "B.".to_string()], |joined| {
            calls.set(calls.get() + 1);
            Ok(joined.to_string())
        })
        .unwrap();
        assert_eq!(out, "A. B.");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_combine_propagates_second_pass_failure() {
        let err = combine(vec!["A.".to_string(), "B.".to_string()], |_| {
            Err(SummarizeError::UnexpectedResponse("boom".to_string()))
        })
        .unwrap_err();
        assert!(matches!(err, SummarizeError::UnexpectedResponse(_)));
    }

    #[test]
    fn test_summarize_chunk_trims_output() {
        let model = MockModel::new(|_, _| Ok("  summary text \n".to_string()));
        assert_eq!(summarize_chunk(&model, "input", bounds()).unwrap(), "summary text");
    }

    #[test]
    fn test_summarize_chunk_passes_bounds_through() {
        let model = MockModel::new(|_, b| Ok(format!("{}-{}", b.min_length, b.max_length)));
        let bounds = LengthBounds {
            min_length: 200,
            max_length: 10,
        };
        // inverted bounds are the generator's problem, not ours
        assert_eq!(summarize_chunk(&model, "x", bounds).unwrap(), "200-10");
    }

    #[test]
    fn test_single_chunk_document_skips_second_pass() {
        let model = MockModel::new(|text, _| Ok(format!(" <{text}> ")));
        let budget = NonZeroUsize::new(10).unwrap();
        let out = summarize_long_text(&model, "short document here", budget, bounds()).unwrap();
        assert_eq!(out, "<short document here>");
        assert_eq!(model.calls(), vec!["short document here"]);
    }

    #[test]
    fn test_multi_chunk_document_reduces_in_order() {
        let model = MockModel::new(|text, _| Ok(text.split_whitespace().next().unwrap_or("").to_string()));
        let budget = NonZeroUsize::new(2).unwrap();
        let out = summarize_long_text(&model, "a b c d e", budget, bounds()).unwrap();
        assert_eq!(model.calls(), vec!["a b", "c d", "e", "a c e"]);
        assert_eq!(out, "a");
    }

    #[test]
    fn test_empty_document_summarizes_one_empty_chunk() {
        let model = MockModel::new(|_, _| Ok("nothing".to_string()));
        let budget = NonZeroUsize::new(8).unwrap();
        let out = summarize_long_text(&model, "", budget, bounds()).unwrap();
        assert_eq!(out, "nothing");
        assert_eq!(model.calls(), vec![""]);
    }

    #[test]
    fn test_tokenizer_failure_stops_before_generation() {
        for tokenizer in [BrokenTokenizer::Encode, BrokenTokenizer::Decode] {
            let model = MockModel::with_tokenizer(tokenizer, |text, _| Ok(text.to_string()));
            let budget = NonZeroUsize::new(4).unwrap();
            let err = summarize_long_text(&model, "a b c d e f", budget, bounds()).unwrap_err();
            assert!(matches!(err, SummarizeError::Tokenizer(_)));
            assert!(model.calls().is_empty());
        }
    }

    #[test]
    fn test_special_tokens_never_reach_the_generator() {
        let model = MockModel::with_tokenizer(WordTokenizer::default(), |text, _| Ok(text.to_string()));
        let budget = NonZeroUsize::new(3).unwrap();
        let text = format!("{SPECIAL_MARKER} a b c {SPECIAL_MARKER}");
        let out = summarize_long_text(&model, &text, budget, bounds()).unwrap();
        assert_eq!(model.calls(), vec!["a b", "c", "a b c"]);
        assert_eq!(out, "a b c");
    }

    #[test]
    fn test_chunk_failure_aborts() {
        let model = MockModel::new(|text, _| {
            if text.contains('c') {
                Err(SummarizeError::Api {
                    status: 503,
                    body: "overloaded".to_string(),
                })
            } else {
                Ok(text.to_string())
            }
        });
        let budget = NonZeroUsize::new(2).unwrap();
        let err = summarize_long_text(&model, "a b c d", budget, bounds()).unwrap_err();
        assert!(matches!(err, SummarizeError::Api { status: 503, .. }));
        // no retry, no second pass
        assert_eq!(model.calls().len(), 2);
    }
}
