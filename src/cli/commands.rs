use std::path::Path;

use chrono::{Local, NaiveDate};

use crate::app::job::{fetch_source, run_job};
use crate::app::{AppContext, PaperfeedError, Result};
use crate::cli::OutputFormat;
use crate::format::{render_html, render_markdown, render_text};
use crate::normalizer::{detect_source, NormalizedFeed, Normalizer, Selection};
use crate::render::write_document;

pub async fn fetch(
    ctx: &AppContext,
    url: &str,
    source_type: Option<&str>,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let selection = Selection::from_hint(source_type);

    // Saved markdown goes through the same writer as batch runs, so it is
    // converted too.
    if let (OutputFormat::Markdown, Some(path)) = (format, output) {
        let (normalized, _) = fetch_source(ctx, url, &selection, Some(path)).await?;
        println!(
            "Saved {} entries from {} to {}",
            normalized.records.len(),
            normalized.feed_name,
            path.display()
        );
        return Ok(());
    }

    let feed = ctx.fetcher.fetch(url).await?;
    let normalized = ctx.normalizer.normalize(&feed, &selection);
    let rendered = render(&normalized, format, Local::now().date_naive())?;

    match output {
        Some(path) => {
            write_document(path, &rendered)?;
            println!(
                "Saved {} entries from {} to {}",
                normalized.records.len(),
                normalized.feed_name,
                path.display()
            );
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

pub fn render(normalized: &NormalizedFeed, format: OutputFormat, date: NaiveDate) -> Result<String> {
    let records = &normalized.records;
    let name = &normalized.feed_name;

    Ok(match format {
        OutputFormat::Text => render_text(records),
        OutputFormat::Markdown => render_markdown(records, name, date),
        OutputFormat::Html => render_html(records, name, date),
        OutputFormat::Json => serde_json::to_string_pretty(normalized)
            .map_err(|e| PaperfeedError::Other(format!("Failed to encode JSON: {}", e)))?,
    })
}

pub async fn detect(ctx: &AppContext, url: &str) -> Result<()> {
    let feed = ctx.fetcher.fetch(url).await?;
    let source_type = detect_source(&feed);
    let resolved = ctx.normalizer.resolve(&feed, &Selection::Auto);

    println!("Source type: {}", source_type);
    println!("Feed name: {}", resolved.feed_name);
    println!("Fields: {}", resolved.field_names().join(", "));
    println!("Entries: {}", feed.entries.len());
    Ok(())
}

pub fn list_sources(ctx: &AppContext) {
    for line in describe_sources(&ctx.normalizer) {
        println!("{}", line);
    }
}

fn describe_sources(normalizer: &Normalizer) -> Vec<String> {
    let registry = normalizer.registry();
    registry
        .names()
        .into_iter()
        .filter_map(|name| {
            registry.lookup(name).map(|config| {
                format!(
                    "{} ({})\n  {}",
                    name,
                    config.feed_name,
                    config.field_names().join(", ")
                )
            })
        })
        .collect()
}

pub async fn run(ctx: &AppContext) -> Result<()> {
    if ctx.config.sources.is_empty() {
        println!("No sources configured. Add [[sources]] to the config file.");
        return Ok(());
    }

    println!("Fetching {} sources...", ctx.config.sources.len());
    let report = run_job(ctx).await?;
    println!(
        "Run complete: {} succeeded, {} failed\n  {}",
        report.succeeded,
        report.failed,
        report.output_dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;
    use crate::normalizer::SourceConfig;

    fn sample() -> NormalizedFeed {
        let record: Record = [("title", "Paper"), ("summary", "S"), ("link", "https://x/1")]
            .into_iter()
            .collect();
        NormalizedFeed {
            feed_name: "arXiv".to_string(),
            records: vec![record],
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_render_text() {
        let out = render(&sample(), OutputFormat::Text, date()).unwrap();
        assert_eq!(out, "[0] Title: Paper\nSummary: S\nLink: https://x/1");
    }

    #[test]
    fn test_render_markdown() {
        let out = render(&sample(), OutputFormat::Markdown, date()).unwrap();
        assert!(out.starts_with("# arXiv (1 entries)\n\nDate: 2024-05-01\n"));
    }

    #[test]
    fn test_render_json_keeps_field_order() {
        let out = render(&sample(), OutputFormat::Json, date()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["feed_name"], "arXiv");
        assert_eq!(value["records"][0]["title"], "Paper");

        let title = out.find("\"title\"").unwrap();
        let link = out.find("\"link\"").unwrap();
        assert!(title < link);
    }

    #[test]
    fn test_describe_sources() {
        let mut normalizer = Normalizer::new();
        normalizer.register("zeta", SourceConfig::new("Zeta").field("title", "title"));

        let lines = describe_sources(&normalizer);
        assert_eq!(lines.len(), normalizer.registry().len());
        assert!(lines[0].starts_with("arxiv (arXiv)"));
        assert_eq!(lines.last().unwrap(), "zeta (Zeta)\n  title");
    }
}
