mod assemble;
mod error;
mod images;
mod lexicon;
mod output;
mod parser;
mod settings;
mod synth;

use std::path::PathBuf;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use tracing::{info, warn};

use assemble::index::BatchIndexes;
use assemble::ProductDraft;
use lexicon::Lexicon;
use settings::Settings;

#[derive(Parser)]
#[command(
    name = "pdp_builder",
    about = "Build canonical product records from captured product pages"
)]
struct Cli {
    /// Output directory (default: $PDP_OUT_DIR or static/products)
    #[arg(short = 'o', long)]
    out: Option<PathBuf>,
    /// Captured product page HTML files
    inputs: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    if cli.inputs.is_empty() {
        Cli::command().print_help()?;
        std::process::exit(2);
    }

    let mut settings = Settings::load();
    if let Some(out) = cli.out {
        settings.out_dir = out;
    }
    if settings.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(settings.workers)
            .build_global()?;
    }

    let lexicon = Lexicon::default();

    println!("Processing {} pages...", cli.inputs.len());
    let drafts = process_pages(&cli.inputs, &lexicon);
    let records = assemble::assemble_batch(drafts, &lexicon);
    let skipped = cli.inputs.len() - records.len();
    let indexes = BatchIndexes::build(&records);
    let files = output::write_batch(&settings.out_dir, &records, &indexes)?;

    println!(
        "Saved {} products ({} skipped), {} categories, {} files in {}.",
        records.len(),
        skipped,
        indexes.categories.len(),
        files,
        settings.out_dir.display(),
    );

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }
    Ok(())
}

/// Parse and synthesize every page in parallel. Output keeps input order;
/// failing pages are logged and dropped.
fn process_pages(paths: &[PathBuf], lexicon: &Lexicon) -> Vec<ProductDraft> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(paths.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }

    let mut drafts = Vec::with_capacity(paths.len());
    for chunk in paths.chunks(500) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|p| assemble::draft(p, lexicon))
            .collect();

        for result in results {
            match result {
                Ok(d) => drafts.push(d),
                Err(e) => warn!("skipping page: {}", e),
            }
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    info!(ok = drafts.len(), total = paths.len(), "pages processed");
    drafts
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
