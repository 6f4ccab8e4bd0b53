// Batch ROUGE scoring of candidate summaries against references.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use voltsum::scoring::{score_pairs, write_scores, PairSource, Summary};

#[derive(Parser)]
#[command(name = "voltsum-rouge", about = "Compute ROUGE scores")]
struct Args {
    /// CSV with columns: reference, candidate
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Directory of reference .txt files
    #[arg(long)]
    refs: Option<PathBuf>,
    /// Directory of candidate .summary.txt files
    #[arg(long)]
    cands: Option<PathBuf>,
    /// Output CSV path
    #[arg(long, default_value = "rouge_scores.csv")]
    out: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let source = PairSource::from_args(args.csv, args.refs, args.cands)?;
    // every input problem surfaces here, before scoring or writing anything
    let pairs = source.load()?;

    let rows = score_pairs(&pairs);
    write_scores(&args.out, &rows)
        .with_context(|| format!("failed to write {}", args.out.display()))?;

    println!("Wrote ROUGE results to {}", args.out.display());
    print!("{}", Summary::new(&rows));
    Ok(())
}
