// Extractive summarization with LexRank: sentences are graph nodes, edges join
// sentences whose TF-IDF cosine similarity clears a threshold, and the
// stationary distribution of the graph ranks them.
use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_segmentation::UnicodeSegmentation;

// Initials and dotted acronyms such as "J." or "U.S."
static INITIALS_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\p{Lu}\.)+$").unwrap());

// Lowercased, without the trailing period
static ABBREVIATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "gen", "gov", "sen", "rep",
        "col", "capt", "lt", "sgt", "rev", "inc", "ltd", "co", "corp", "dept", "univ", "vs",
        "etc", "e.g", "i.e", "fig", "vol", "approx", "est", "jan", "feb", "mar", "apr",
        "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
    ]
    .iter()
    .copied()
    .collect()
});

static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}']+").unwrap());

// Common stop words ignored when comparing sentences
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from",
        "has", "he", "in", "is", "it", "its", "of", "on", "that", "the",
        "to", "was", "will", "with", "this", "but", "they", "have",
        "had", "what", "when", "where", "who", "which", "why", "how",
        "i", "we", "you", "she", "or", "not", "so", "were", "been", "their",
    ]
    .iter()
    .copied()
    .collect()
});

const SIMILARITY_THRESHOLD: f64 = 0.1;
const DAMPING: f64 = 0.85;
const EPSILON: f64 = 1e-6;
const MAX_ITERATIONS: usize = 100;

/// Return the `sentence_count` highest ranked sentences of `text`, in document
/// order, joined by spaces. Short inputs come back whole.
pub fn extractive_summary(text: &str, sentence_count: usize) -> String {
    let sentences = split_sentences(text);
    if sentences.len() <= sentence_count {
        return sentences.join(" ");
    }

    let scores = lexrank(&sentences);
    let mut ranked: Vec<usize> = (0..sentences.len()).collect();
    ranked.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(std::cmp::Ordering::Equal));

    let mut selected: Vec<usize> = ranked.into_iter().take(sentence_count).collect();
    selected.sort_unstable();

    selected
        .iter()
        .map(|&i| sentences[i])
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Sentences of `text`, trimmed. Boundaries follow Unicode sentence
/// segmentation (so decimals like "3.5" stay intact); a boundary right after
/// a title, common abbreviation or initial is dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    for (start, piece) in text.split_sentence_bound_indices() {
        let end = start + piece.len();
        match spans.last_mut() {
            Some(last) if ends_with_abbreviation(&text[last.0..last.1]) => last.1 = end,
            _ => spans.push((start, end)),
        }
    }

    spans
        .into_iter()
        .map(|(start, end)| text[start..end].trim())
        .filter(|s| !s.is_empty())
        .collect()
}

fn ends_with_abbreviation(sentence: &str) -> bool {
    let Some(word) = sentence.split_whitespace().last() else {
        return false;
    };
    let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());
    let Some(stem) = word.strip_suffix('.') else {
        return false;
    };
    INITIALS_PATTERN.is_match(word) || ABBREVIATIONS.contains(stem.to_lowercase().as_str())
}

fn sentence_terms(sentence: &str, stemmer: &Stemmer) -> Vec<String> {
    WORD_PATTERN
        .find_iter(sentence)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| !STOP_WORDS.contains(w.as_str()))
        .map(|w| stemmer.stem(&w).into_owned())
        .collect()
}

/// Term frequency normalized by the most frequent term of the sentence.
fn term_frequencies(terms: &[String]) -> HashMap<&str, f64> {
    let mut counts: HashMap<&str, f64> = HashMap::new();
    for t in terms {
        *counts.entry(t.as_str()).or_insert(0.0) += 1.0;
    }
    let max = counts.values().copied().fold(0.0, f64::max);
    if max > 0.0 {
        for v in counts.values_mut() {
            *v /= max;
        }
    }
    counts
}

fn idf_cosine(a: &HashMap<&str, f64>, b: &HashMap<&str, f64>, idf: &HashMap<&str, f64>) -> f64 {
    let weight = |term: &str| idf.get(term).copied().unwrap_or(0.0);
    let dot: f64 = a
        .iter()
        .filter_map(|(term, tf_a)| b.get(term).map(|tf_b| tf_a * tf_b * weight(*term).powi(2)))
        .sum();
    let norm = |v: &HashMap<&str, f64>| v.iter().map(|(t, tf)| (tf * weight(*t)).powi(2)).sum::<f64>().sqrt();
    let denom = norm(a) * norm(b);
    if denom > 0.0 {
        dot / denom
    } else {
        0.0
    }
}

fn lexrank(sentences: &[&str]) -> Vec<f64> {
    let n = sentences.len();
    let stemmer = Stemmer::create(Algorithm::English);
    let terms: Vec<Vec<String>> = sentences.iter().map(|s| sentence_terms(s, &stemmer)).collect();
    let tfs: Vec<HashMap<&str, f64>> = terms.iter().map(|t| term_frequencies(t)).collect();

    let mut doc_freq: HashMap<&str, usize> = HashMap::new();
    for tf in &tfs {
        for term in tf.keys() {
            *doc_freq.entry(*term).or_insert(0) += 1;
        }
    }
    let idf: HashMap<&str, f64> = doc_freq
        .into_iter()
        .map(|(term, df)| (term, (1.0 + n as f64 / df as f64).ln()))
        .collect();

    // Thresholded adjacency without self-loops, row-normalized by degree.
    let mut matrix = vec![vec![0.0f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            if idf_cosine(&tfs[i], &tfs[j], &idf) > SIMILARITY_THRESHOLD {
                matrix[i][j] = 1.0;
                matrix[j][i] = 1.0;
            }
        }
    }
    for row in matrix.iter_mut() {
        let degree: f64 = row.iter().sum();
        if degree > 0.0 {
            row.iter_mut().for_each(|v| *v /= degree);
        }
    }

    let mut scores = vec![1.0 / n as f64; n];
    for _ in 0..MAX_ITERATIONS {
        let next: Vec<f64> = (0..n)
            .map(|i| {
                let inflow: f64 = (0..n).map(|j| matrix[j][i] * scores[j]).sum();
                (1.0 - DAMPING) / n as f64 + DAMPING * inflow
            })
            .collect();
        let delta = next.iter().zip(&scores).map(|(a, b)| (a - b).abs()).fold(0.0, f64::max);
        scores = next;
        if delta < EPSILON {
            break;
        }
    }
    scores
}
