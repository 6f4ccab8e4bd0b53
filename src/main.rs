// Command-line front end: collect documents, summarize them, print the results.
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::{debug, info};

use voltsum::config::Settings;
use voltsum::input::{load_document, preview, scan_dir, Document};
use voltsum::model::{CachedProvider, HfInferenceProvider, LengthBounds};
use voltsum::nlp::token_budget;
use voltsum::summarizer::{Mode, Summarizer, SummaryParams};

#[derive(Parser)]
#[command(name = "voltsum", about = "Abstractive and extractive summaries of text and PDF files")]
struct Cli {
    /// Config file (defaults to <config dir>/voltsum/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize typed text, text/PDF files, or stdin
    Summarize {
        /// Text to summarize
        #[arg(short, long, conflicts_with_all = ["files", "dir"])]
        text: Option<String>,
        /// .txt or .pdf file; repeat for several
        #[arg(short = 'f', long = "file")]
        files: Vec<PathBuf>,
        /// Summarize every .txt and .pdf file under this directory
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// abstractive or extractive
        #[arg(long, default_value = "abstractive")]
        mode: String,
        /// Abstractive model id (e.g. facebook/bart-large-cnn, t5-small)
        #[arg(short, long)]
        model: Option<String>,
        #[arg(long)]
        min_length: Option<usize>,
        #[arg(long)]
        max_length: Option<usize>,
        /// Number of sentences for extractive mode
        #[arg(short, long)]
        sentences: Option<usize>,
        /// Documents summarized in parallel
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,
    },
    /// List known models with their context limit and chunk budget
    Models,
}

struct Overrides {
    model: Option<String>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    sentences: Option<usize>,
}

fn resolve_params(defaults: &SummaryParams, overrides: Overrides) -> SummaryParams {
    SummaryParams {
        model: overrides.model.unwrap_or_else(|| defaults.model.clone()),
        bounds: LengthBounds {
            min_length: overrides.min_length.unwrap_or(defaults.bounds.min_length),
            max_length: overrides.max_length.unwrap_or(defaults.bounds.max_length),
        },
        sentences: overrides.sentences.unwrap_or(defaults.sentences),
    }
}

/// Typed text wins; otherwise files plus a directory scan; otherwise stdin.
/// Empty typed or piped text yields no documents.
fn collect_documents(text: Option<String>, files: &[PathBuf], dir: Option<&Path>) -> Result<Vec<Document>> {
    let mut paths = files.to_vec();
    if let Some(dir) = dir {
        paths.extend(scan_dir(dir));
    }

    if text.is_none() && !paths.is_empty() {
        return paths
            .iter()
            .map(|p| load_document(p).with_context(|| format!("failed to read {}", p.display())))
            .collect();
    }

    let text = match text {
        Some(t) => t,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
            buf
        }
    };
    Ok(if text.is_empty() {
        Vec::new()
    } else {
        vec![Document::from_text(text)]
    })
}

/// Summarize `docs` and hand each summary to `emit` in input order as soon as
/// it and every earlier one are done. The first failure stops emission; the
/// summaries before it have already been emitted.
fn summarize_documents<F>(
    summarizer: &Summarizer,
    docs: &[Document],
    mode: Mode,
    params: &SummaryParams,
    jobs: usize,
    mut emit: F,
) -> Result<()>
where
    F: FnMut(&Document, &str) -> Result<()>,
{
    let pb = if docs.len() > 1 {
        let pb = ProgressBar::new(docs.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {wide_bar} {pos}/{len} {msg}")?
                .progress_chars("=>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let run = |doc: &Document| {
        let summary = summarizer
            .summarize(&doc.text, mode, params)
            .with_context(|| format!("failed to summarize {}", doc.name));
        pb.inc(1);
        summary
    };

    let outcome = if jobs > 1 {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
        // documents after the earliest failure are skipped
        let first_failure = AtomicUsize::new(usize::MAX);
        let (tx, rx) = mpsc::channel();

        thread::scope(|s| -> Result<()> {
            let (pool, first_failure, run) = (&pool, &first_failure, &run);
            s.spawn(move || {
                pool.install(|| {
                    docs.par_iter().enumerate().for_each_with(tx, |tx, (i, doc)| {
                        if i > first_failure.load(Ordering::SeqCst) {
                            return;
                        }
                        let summary = run(doc);
                        if summary.is_err() {
                            first_failure.fetch_min(i, Ordering::SeqCst);
                        }
                        let _ = tx.send((i, summary));
                    })
                })
            });

            let mut finished = BTreeMap::new();
            let mut next = 0;
            for (i, summary) in rx {
                finished.insert(i, summary);
                while let Some(summary) = finished.remove(&next) {
                    let summary = summary?;
                    pb.suspend(|| emit(&docs[next], &summary))?;
                    next += 1;
                }
            }
            Ok(())
        })
    } else {
        docs.iter().try_for_each(|doc| {
            let summary = run(doc)?;
            pb.suspend(|| emit(doc, &summary))
        })
    };

    pb.finish_and_clear();
    outcome
}

fn print_heading(out: &mut StandardStream, heading: &str) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
    writeln!(out, "{heading}")?;
    out.reset()
}

fn build_summarizer(settings: &Settings) -> Result<Summarizer> {
    let provider = HfInferenceProvider::new(
        settings.inference_url.clone(),
        settings.api_token(),
        settings.request_timeout(),
    )
    .context("failed to create inference client")?;
    let provider = CachedProvider::new(provider, settings.cache_capacity);
    Ok(Summarizer::new(Arc::new(provider), settings.registry()).with_budget_ratio(settings.budget_ratio)?)
}

fn run_summarize(settings: &Settings, docs: Vec<Document>, mode: Mode, params: SummaryParams, jobs: usize) -> Result<()> {
    if docs.is_empty() {
        eprintln!("Nothing to summarize: provide --text, --file, --dir or pipe text on stdin.");
        return Ok(());
    }
    info!(documents = docs.len(), ?mode, model = %params.model, "summarizing");

    let mut out = StandardStream::stdout(ColorChoice::Auto);
    let typed = docs.len() == 1 && docs[0].name == "Text Input";
    if !typed {
        for doc in &docs {
            print_heading(&mut out, &format!("Preview: {}", doc.name))?;
            writeln!(out, "{}\n", preview(&doc.text))?;
        }
    }

    let summarizer = build_summarizer(settings)?;
    summarize_documents(&summarizer, &docs, mode, &params, jobs, |doc, summary| {
        print_heading(&mut out, &format!("Summary: {}", doc.name))?;
        writeln!(out, "{summary}")?;
        writeln!(out, "---")?;
        out.flush()?;
        Ok(())
    })
}

fn run_models(settings: &Settings) -> Result<()> {
    let mut out = StandardStream::stdout(ColorChoice::Auto);
    print_heading(&mut out, &format!("{:<36} {:>8} {:>8}", "MODEL", "CONTEXT", "BUDGET"))?;
    for spec in settings.registry().iter() {
        let budget = token_budget(spec.context_limit, settings.budget_ratio);
        writeln!(out, "{:<36} {:>8} {:>8}", spec.id, spec.context_limit, budget)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("failed to load configuration")?;
    debug!(?settings, "configuration loaded");

    match cli.command {
        Commands::Summarize {
            text,
            files,
            dir,
            mode,
            model,
            min_length,
            max_length,
            sentences,
            jobs,
        } => {
            let mode = Mode::from_name(&mode.to_lowercase());
            let params = resolve_params(
                &settings.defaults,
                Overrides {
                    model,
                    min_length,
                    max_length,
                    sentences,
                },
            );
            let docs = collect_documents(text, &files, dir.as_deref())?;
            run_summarize(&settings, docs, mode, params, jobs)?
        }
        Commands::Models => run_models(&settings)?,
    }
    Ok(())
}
