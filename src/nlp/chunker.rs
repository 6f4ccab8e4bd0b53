// Token-window chunking for models with a bounded input context.
use std::num::NonZeroUsize;

use crate::error::Result;
use crate::model::TextTokenizer;

/// Split `text` into consecutive, non-overlapping token windows of at most
/// `budget` tokens, decoded back to text in order.
///
/// Always yields at least one chunk: text that encodes to no tokens comes back
/// as a single empty string so callers have one unit to summarize.
pub fn chunk_text<T>(tokenizer: &T, text: &str, budget: NonZeroUsize) -> Result<Vec<String>>
where
    T: TextTokenizer + ?Sized,
{
    let ids = tokenizer.encode(text)?;
    if ids.is_empty() {
        return Ok(vec![String::new()]);
    }

    ids.chunks(budget.get())
        .map(|window| tokenizer.decode(window))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SummarizeError;
    use crate::test_support::{BrokenTokenizer, WordTokenizer, SPECIAL_MARKER, SPECIAL_TOKEN};

    fn budget(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let tok = WordTokenizer::default();
        let chunks = chunk_text(&tok, "one two three", budget(5)).unwrap();
        assert_eq!(chunks, vec!["one two three"]);
    }

    #[test]
    fn test_windows_are_consecutive_and_last_is_shorter() {
        let tok = WordTokenizer::default();
        let chunks = chunk_text(&tok, "a b c d e f g", budget(3)).unwrap();
        assert_eq!(chunks, vec!["a b c", "d e f", "g"]);
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_empty_chunk() {
        let tok = WordTokenizer::default();
        let chunks = chunk_text(&tok, "a b c d", budget(2)).unwrap();
        assert_eq!(chunks, vec!["a b", "c d"]);
    }

    #[test]
    fn test_empty_text_yields_single_empty_chunk() {
        let tok = WordTokenizer::default();
        assert_eq!(chunk_text(&tok, "", budget(4)).unwrap(), vec![String::new()]);
        assert_eq!(chunk_text(&tok, "  \n\t ", budget(4)).unwrap(), vec![String::new()]);
    }

    #[test]
    fn test_special_tokens_count_toward_budget_but_are_not_decoded() {
        let tok = WordTokenizer::default();
        let text = format!("a {SPECIAL_MARKER} b c");
        assert_eq!(tok.encode(&text).unwrap()[1], SPECIAL_TOKEN);

        let chunks = chunk_text(&tok, &text, budget(2)).unwrap();
        assert_eq!(chunks, vec!["a", "b c"]);
        assert!(chunks.iter().all(|c| !c.contains(SPECIAL_MARKER)));
    }

    #[test]
    fn test_tokenizer_errors_propagate() {
        let err = chunk_text(&BrokenTokenizer::Encode, "some text", budget(4)).unwrap_err();
        assert!(matches!(err, SummarizeError::Tokenizer(ref msg) if msg == "vocabulary not loaded"));

        let err = chunk_text(&BrokenTokenizer::Decode, "some text", budget(4)).unwrap_err();
        assert!(matches!(err, SummarizeError::Tokenizer(ref msg) if msg == "unknown id"));
    }

    #[test]
    fn test_budget_of_one() {
        let tok = WordTokenizer::default();
        let chunks = chunk_text(&tok, "x y", budget(1)).unwrap();
        assert_eq!(chunks, vec!["x", "y"]);
    }
}
