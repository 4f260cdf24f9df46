mod analyze;
mod git;
mod model;
mod report;
mod utils;

use crate::analyze::extract;
use crate::git::CommitFilter;
use crate::report::{PdfReport, TextReport};
use crate::utils::RepoProgress;
use anyhow::Context;
use chrono::Local;
use clap::Parser;
use model::{AggregateReport, Config, RepositorySummary};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TEXT_REPORT: &str = "report.txt";
const PDF_REPORT: &str = "report.pdf";

/// Collects one author's commits across repositories into a text and PDF report.
#[derive(Parser, Debug, Clone)]
#[command(name = "commit-report", version)]
struct Args {
    /// JSON file with developer, author, since, until and repositories
    #[arg(long = "config", default_value = "report.json")]
    config_path: PathBuf,
    /// Directory holding the local clones, one per repository
    #[arg(long = "cache_path", default_value = ".")]
    repos_cache_path: PathBuf,
    /// Directory the reports are written to
    #[arg(long = "output", default_value = ".")]
    output_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    run(&args)
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = Config::from_config(&args.config_path)
        .with_context(|| format!("Failed to load config `{}`", args.config_path.display()))?;
    info!(
        developer = %config.developer,
        author = %config.author,
        range = %config.date_range,
        repositories = config.repositories.len(),
        "loaded config"
    );

    fs::create_dir_all(&args.repos_cache_path).with_context(|| {
        format!(
            "Failed to create cache directory `{}`",
            args.repos_cache_path.display()
        )
    })?;
    let filter = CommitFilter::new(&config.author, config.date_range);
    let summaries = collect_summaries(&config, &filter, &args.repos_cache_path);

    let report = AggregateReport::new(
        &config.developer,
        Local::now().naive_local(),
        config.date_range,
        summaries,
    );

    fs::create_dir_all(&args.output_path).with_context(|| {
        format!(
            "Failed to create output directory `{}`",
            args.output_path.display()
        )
    })?;
    let text_path = args.output_path.join(TEXT_REPORT);
    let text = report
        .write_text(&text_path)
        .with_context(|| format!("Failed to write `{}`", text_path.display()))?;
    println!("{text}");
    println!("Report saved to {}", text_path.display());

    let pdf_path = args.output_path.join(PDF_REPORT);
    let layout = report
        .write_pdf(&pdf_path)
        .with_context(|| format!("Failed to write `{}`", pdf_path.display()))?;
    for (position, summary) in report.summaries().iter().enumerate() {
        let first_page = layout.rows_for(position).next().map(|row| row.page + 1);
        debug!(
            repo = summary.repo_name(),
            rows = layout.rows_for(position).count(),
            first_page,
            "laid out commit table"
        );
    }
    info!(pages = layout.pages.len(), rows = layout.rows.len(), "rendered PDF");
    println!("PDF report generated and saved as {}", pdf_path.display());

    Ok(())
}

/// Extracts every configured repository in order, skipping the ones that fail.
fn collect_summaries(
    config: &Config,
    filter: &CommitFilter,
    cache_path: &Path,
) -> Vec<RepositorySummary> {
    let mut summaries = Vec::new();
    for repo in &config.repositories {
        info!("Processing repository: {}", repo.url);
        let progress = RepoProgress::new(&repo.name);
        let local_path = cache_path.join(&repo.name);
        let result = extract(
            repo,
            &local_path,
            filter,
            Box::new(|kind, current, total| progress.on_fetch(kind, current, total)),
        );
        match result {
            Ok(summary) => {
                progress.finish(&summary);
                summaries.push(summary);
            }
            Err(err) => {
                progress.fail(&err);
                warn!(repo = %repo.name, "Failed to process {}: {}", repo.url, err);
            }
        }
    }
    summaries
}
