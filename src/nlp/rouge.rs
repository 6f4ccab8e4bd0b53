// ROUGE-1, ROUGE-2 and ROUGE-Lsum F-measures over stemmed tokens.
use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::porter;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Tokens of length <= this are left unstemmed.
const MIN_STEM_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RougeScore {
    pub precision: f64,
    pub recall: f64,
    pub fmeasure: f64,
}

impl RougeScore {
    fn from_counts(hits: usize, reference_len: usize, candidate_len: usize) -> Self {
        let precision = hits as f64 / candidate_len.max(1) as f64;
        let recall = hits as f64 / reference_len.max(1) as f64;
        let fmeasure = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            fmeasure,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RougeScores {
    pub rouge1: RougeScore,
    pub rouge2: RougeScore,
    pub rouge_lsum: RougeScore,
}

pub struct RougeScorer {
    use_stemmer: bool,
}

impl Default for RougeScorer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RougeScorer {
    pub fn new(use_stemmer: bool) -> Self {
        Self { use_stemmer }
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        NON_ALNUM
            .replace_all(&lowered, " ")
            .split_whitespace()
            .map(|tok| {
                if self.use_stemmer && tok.len() > MIN_STEM_LEN {
                    porter::stem(tok)
                } else {
                    tok.to_string()
                }
            })
            .filter(|tok| !tok.is_empty())
            .collect()
    }

    pub fn score(&self, reference: &str, candidate: &str) -> RougeScores {
        let ref_tokens = self.tokenize(reference);
        let cand_tokens = self.tokenize(candidate);
        RougeScores {
            rouge1: rouge_n(&ref_tokens, &cand_tokens, 1),
            rouge2: rouge_n(&ref_tokens, &cand_tokens, 2),
            rouge_lsum: self.rouge_lsum(reference, candidate),
        }
    }

    /// Summary-level LCS: texts are split into sentences on newlines and each
    /// reference sentence is matched against the union of its LCS with every
    /// candidate sentence.
    fn rouge_lsum(&self, reference: &str, candidate: &str) -> RougeScore {
        let sentences = |text: &str| -> Vec<Vec<String>> {
            text.split('\n')
                .filter(|line| !line.is_empty())
                .map(|line| self.tokenize(line))
                .collect()
        };
        let ref_sents = sentences(reference);
        let cand_sents = sentences(candidate);

        let ref_len: usize = ref_sents.iter().map(Vec::len).sum();
        let cand_len: usize = cand_sents.iter().map(Vec::len).sum();
        if ref_len == 0 || cand_len == 0 {
            return RougeScore::default();
        }

        let mut ref_counts = token_counts(ref_sents.iter().flatten());
        let mut cand_counts = token_counts(cand_sents.iter().flatten());

        let mut hits = 0;
        for ref_sent in &ref_sents {
            for token in union_lcs(ref_sent, &cand_sents) {
                let (Some(r), Some(c)) = (ref_counts.get_mut(token), cand_counts.get_mut(token)) else {
                    continue;
                };
                if *r > 0 && *c > 0 {
                    hits += 1;
                    *r -= 1;
                    *c -= 1;
                }
            }
        }
        RougeScore::from_counts(hits, ref_len, cand_len)
    }
}

fn token_counts<'a>(tokens: impl Iterator<Item = &'a String>) -> HashMap<&'a str, usize> {
    let mut counts = HashMap::new();
    for t in tokens {
        *counts.entry(t.as_str()).or_insert(0) += 1;
    }
    counts
}

fn ngrams(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    for gram in tokens.windows(n) {
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}

fn rouge_n(reference: &[String], candidate: &[String], n: usize) -> RougeScore {
    let ref_grams = ngrams(reference, n);
    let cand_grams = ngrams(candidate, n);
    let overlap: usize = ref_grams
        .iter()
        .map(|(gram, &count)| count.min(cand_grams.get(gram).copied().unwrap_or(0)))
        .sum();
    RougeScore::from_counts(overlap, ref_grams.values().sum(), cand_grams.values().sum())
}

/// Indices into `reference` of one longest common subsequence with `candidate`.
fn lcs_indices(reference: &[String], candidate: &[String]) -> Vec<usize> {
    let (rows, cols) = (reference.len(), candidate.len());
    let mut table = vec![vec![0usize; cols + 1]; rows + 1];
    for i in 1..=rows {
        for j in 1..=cols {
            table[i][j] = if reference[i - 1] == candidate[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }

    let mut indices = Vec::new();
    let (mut i, mut j) = (rows, cols);
    while i != 0 && j != 0 {
        if reference[i - 1] == candidate[j - 1] {
            indices.push(i - 1);
            i -= 1;
            j -= 1;
        } else if table[i][j - 1] > table[i - 1][j] {
            j -= 1;
        } else {
            i -= 1;
        }
    }
    indices.reverse();
    indices
}

fn union_lcs<'a>(reference: &'a [String], candidates: &[Vec<String>]) -> Vec<&'a str> {
    let union: BTreeSet<usize> = candidates
        .iter()
        .flat_map(|cand| lcs_indices(reference, cand))
        .collect();
    union.into_iter().map(|i| reference[i].as_str()).collect()
}
