//! The batch job: fetch every configured source, write its digest, and
//! optionally summarize it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::app::{AppContext, Result};
use crate::config::FeedSource;
use crate::domain::Feed;
use crate::format::render_text;
use crate::normalizer::{NormalizedFeed, Selection};
use crate::render::{pdf_path, write_document, write_markdown};
use crate::summarizer::summarize;

/// Outcome of one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub output_dir: PathBuf,
    pub succeeded: usize,
    pub failed: usize,
}

/// Hour-granular stamp used in run directory and file names.
pub fn run_stamp(now: DateTime<Local>) -> String {
    now.format("%Y%m%d_%H").to_string()
}

/// Fetch and normalize one feed. When `md_file` is given the markdown digest
/// is written there and converted next to it.
///
/// Returns the normalized feed and its plain-text rendering.
pub async fn fetch_source(
    ctx: &AppContext,
    url: &str,
    selection: &Selection,
    md_file: Option<&Path>,
) -> Result<(NormalizedFeed, String)> {
    let feed = ctx.fetcher.fetch(url).await?;
    write_normalized(ctx, &feed, selection, md_file).await
}

async fn write_normalized(
    ctx: &AppContext,
    feed: &Feed,
    selection: &Selection,
    md_file: Option<&Path>,
) -> Result<(NormalizedFeed, String)> {
    let normalized = ctx.normalizer.normalize(feed, selection);
    tracing::info!(
        "{}: {} entries",
        normalized.feed_name,
        normalized.records.len()
    );

    if let Some(path) = md_file {
        write_markdown(&normalized.records, path, &normalized.feed_name)?;
        ctx.converter.convert(path, &pdf_path(path)).await;
    }

    let text = render_text(&normalized.records);
    Ok((normalized, text))
}

/// Run the batch job into `<output root>/feeds_<stamp>` for the current hour.
pub async fn run_job(ctx: &AppContext) -> Result<JobReport> {
    let root = ctx.config.output_root()?;
    run_job_in(ctx, &root, &run_stamp(Local::now())).await
}

/// Run the batch job into `<root>/feeds_<stamp>`.
///
/// Sources are fetched concurrently and processed in configuration order. A
/// failing source is logged and counted; the others still run.
pub async fn run_job_in(ctx: &AppContext, root: &Path, stamp: &str) -> Result<JobReport> {
    let output_dir = root.join(format!("feeds_{}", stamp));
    std::fs::create_dir_all(&output_dir)?;

    let sources = &ctx.config.sources;
    let mut report = JobReport {
        output_dir: output_dir.clone(),
        succeeded: 0,
        failed: 0,
    };

    if sources.is_empty() {
        tracing::warn!("No sources configured");
        return Ok(report);
    }

    tracing::info!("Running job for {} sources into {}", sources.len(), output_dir.display());

    let urls = sources.iter().map(|s| s.url.clone()).collect();
    let results = ctx.parallel_fetcher.fetch_all(urls).await;

    for (source, (_, result)) in sources.iter().zip(results) {
        let outcome = match result {
            Ok(feed) => process_source(ctx, &output_dir, stamp, source, &feed).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => report.succeeded += 1,
            Err(e) => {
                report.failed += 1;
                tracing::error!("Source {} ({}) failed: {}", source.name, source.url, e);
            }
        }
    }

    tracing::info!(
        "Job complete: {} succeeded, {} failed",
        report.succeeded,
        report.failed
    );
    Ok(report)
}

async fn process_source(
    ctx: &AppContext,
    output_dir: &Path,
    stamp: &str,
    source: &FeedSource,
    feed: &Feed,
) -> Result<()> {
    let selection = Selection::from_hint(source.source_type.as_deref());
    let md_file = output_dir.join(format!("{}_org_{}.md", source.name, stamp));
    let (normalized, text) = write_normalized(ctx, feed, &selection, Some(&md_file)).await?;

    if !ctx.config.summary.enabled || !source.summarize {
        return Ok(());
    }
    if normalized.records.is_empty() {
        tracing::warn!("{}: no entries to summarize", source.name);
        return Ok(());
    }

    let summary_file = output_dir.join(format!("{}_summary_{}.md", source.name, stamp));
    if summary_file.exists() {
        tracing::info!("Summary already exists, skipping: {}", summary_file.display());
        return Ok(());
    }

    let summary = summarize(
        ctx.summarizer.as_ref(),
        &ctx.config.summary.prompt,
        &text,
        ctx.config.summary.iterations,
    )
    .await?;

    write_document(&summary_file, &summary)?;
    tracing::info!("Summary saved: {}", summary_file.display());
    ctx.converter.convert(&summary_file, &pdf_path(&summary_file)).await;

    Ok(())
}
