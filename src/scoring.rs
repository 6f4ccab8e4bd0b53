// Batch ROUGE evaluation of candidate summaries against references.
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use walkdir::WalkDir;

use crate::nlp::RougeScorer;

const REFERENCE_EXT: &str = ".txt";
const CANDIDATE_SUFFIX: &str = ".summary.txt";
const OUTPUT_HEADER: [&str; 4] = ["name", "rouge1_f", "rouge2_f", "rougeLsum_f"];

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("Provide --csv OR both --refs and --cands")]
    MissingInput,

    #[error("CSV must have 'reference' and 'candidate' columns (missing: {})", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error(
        "No filename-matched pairs found in {} and {}. Ensure refs are .txt and cands are .summary.txt",
        .refs.display(),
        .cands.display()
    )]
    NoMatchedPairs { refs: PathBuf, cands: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    ReadDir { path: PathBuf, source: walkdir::Error },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScoreError>;

/// A reference/candidate text pair with a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorePair {
    pub name: String,
    pub reference: String,
    pub candidate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
    pub name: String,
    pub rouge1_f: f64,
    pub rouge2_f: f64,
    #[serde(rename = "rougeLsum_f")]
    pub rouge_lsum_f: f64,
}

/// Where the pairs come from.
#[derive(Debug, Clone)]
pub enum PairSource {
    Csv(PathBuf),
    Dirs { refs: PathBuf, cands: PathBuf },
}

impl PairSource {
    /// A CSV path wins; otherwise both directories are required.
    pub fn from_args(csv: Option<PathBuf>, refs: Option<PathBuf>, cands: Option<PathBuf>) -> Result<Self> {
        match (csv, refs, cands) {
            (Some(csv), _, _) => Ok(PairSource::Csv(csv)),
            (None, Some(refs), Some(cands)) => Ok(PairSource::Dirs { refs, cands }),
            _ => Err(ScoreError::MissingInput),
        }
    }

    pub fn load(&self) -> Result<Vec<ScorePair>> {
        match self {
            PairSource::Csv(path) => load_from_csv(path),
            PairSource::Dirs { refs, cands } => load_from_dirs(refs, cands),
        }
    }
}

pub fn load_from_csv(path: &Path) -> Result<Vec<ScorePair>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let (reference_col, candidate_col) = match (column("reference"), column("candidate")) {
        (Some(r), Some(c)) => (r, c),
        (r, c) => {
            let missing = [("reference", r), ("candidate", c)]
                .into_iter()
                .filter(|(_, idx)| idx.is_none())
                .map(|(name, _)| name.to_string())
                .collect();
            return Err(ScoreError::MissingColumns(missing));
        }
    };

    reader
        .records()
        .enumerate()
        .map(|(i, record)| -> Result<ScorePair> {
            let record = record?;
            Ok(ScorePair {
                name: format!("row_{i}"),
                reference: record.get(reference_col).unwrap_or_default().to_string(),
                candidate: record.get(candidate_col).unwrap_or_default().to_string(),
            })
        })
        .collect()
}

/// Pair `<refs>/<stem>.txt` with `<cands>/<stem>.summary.txt`, sorted by stem.
/// Stems without a candidate are skipped.
pub fn load_from_dirs(refs: &Path, cands: &Path) -> Result<Vec<ScorePair>> {
    let mut stems = Vec::new();
    for entry in WalkDir::new(refs).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| ScoreError::ReadDir {
            path: refs.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(stem) = entry.file_name().to_str().and_then(|n| n.strip_suffix(REFERENCE_EXT)) {
            stems.push(stem.to_string());
        }
    }
    stems.sort();

    let mut pairs = Vec::new();
    for stem in stems {
        let cand_path = cands.join(format!("{stem}{CANDIDATE_SUFFIX}"));
        if !cand_path.is_file() {
            continue;
        }
        pairs.push(ScorePair {
            reference: fs::read_to_string(refs.join(format!("{stem}{REFERENCE_EXT}")))?,
            candidate: fs::read_to_string(&cand_path)?,
            name: stem,
        });
    }

    if pairs.is_empty() {
        return Err(ScoreError::NoMatchedPairs {
            refs: refs.to_path_buf(),
            cands: cands.to_path_buf(),
        });
    }
    Ok(pairs)
}

/// Score every pair with stemmed rouge1 / rouge2 / rougeLsum, keeping input order.
pub fn score_pairs(pairs: &[ScorePair]) -> Vec<ScoreRow> {
    let scorer = RougeScorer::new(true);
    let rows: Vec<ScoreRow> = pairs
        .par_iter()
        .map(|pair| {
            let s = scorer.score(&pair.reference, &pair.candidate);
            ScoreRow {
                name: pair.name.clone(),
                rouge1_f: s.rouge1.fmeasure,
                rouge2_f: s.rouge2.fmeasure,
                rouge_lsum_f: s.rouge_lsum.fmeasure,
            }
        })
        .collect();
    info!(pairs = rows.len(), "scored pairs");
    rows
}

/// Header first, then one line per row; an empty run still gets the header.
pub fn write_scores(path: &Path, rows: &[ScoreRow]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(OUTPUT_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// count / mean / std / min / quartiles / max for one metric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; NaN below two values.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        } else {
            f64::NAN
        };

        Some(Self {
            count,
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }
}

/// Linear interpolation between closest ranks on sorted input.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Per-metric summary statistics table.
pub struct Summary {
    columns: Vec<(&'static str, ColumnStats)>,
}

impl Summary {
    pub fn new(rows: &[ScoreRow]) -> Self {
        let metrics: [(&'static str, fn(&ScoreRow) -> f64); 3] = [
            ("rouge1_f", |r| r.rouge1_f),
            ("rouge2_f", |r| r.rouge2_f),
            ("rougeLsum_f", |r| r.rouge_lsum_f),
        ];
        let columns = metrics
            .into_iter()
            .filter_map(|(name, get)| {
                let values: Vec<f64> = rows.iter().map(get).collect();
                ColumnStats::from_values(&values).map(|stats| (name, stats))
            })
            .collect();
        Self { columns }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnStats> {
        self.columns.iter().find(|(n, _)| *n == name).map(|(_, s)| s)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<6}", "")?;
        for (name, _) in &self.columns {
            write!(f, " {name:>12}")?;
        }
        writeln!(f)?;

        let stats: [(&str, fn(&ColumnStats) -> f64); 8] = [
            ("count", |s| s.count as f64),
            ("mean", |s| s.mean),
            ("std", |s| s.std),
            ("min", |s| s.min),
            ("25%", |s| s.q25),
            ("50%", |s| s.median),
            ("75%", |s| s.q75),
            ("max", |s| s.max),
        ];
        for (label, get) in stats {
            write!(f, "{label:<6}")?;
            for (_, column) in &self.columns {
                write!(f, " {:>12.6}", get(column))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
