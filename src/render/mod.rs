//! Writing rendered digests to disk and converting them to distributable
//! documents.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;
use tokio::process::Command;

use crate::app::Result;
use crate::domain::Record;
use crate::format::render_markdown;

/// Render `records` as markdown and write them to `path`, creating parent
/// directories as needed.
pub fn write_markdown(records: &[Record], path: &Path, feed_name: &str) -> Result<()> {
    let markdown = render_markdown(records, feed_name, Local::now().date_naive());
    write_document(path, &markdown)?;
    tracing::info!("Markdown saved: {}", path.display());
    Ok(())
}

pub fn write_document(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

/// The `.pdf` sibling of a markdown path.
pub fn pdf_path(markdown: &Path) -> PathBuf {
    markdown.with_extension("pdf")
}

/// Converts a rendered document into another format.
///
/// Conversion is best-effort: implementations log failures and report them
/// only through the returned flag.
#[async_trait]
pub trait Converter {
    async fn convert(&self, source: &Path, destination: &Path) -> bool;
}

/// Runs an external `<command> <source> <destination>` converter such as
/// `md2pdf`.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    pub command: String,
}

impl Default for CommandConverter {
    fn default() -> Self {
        Self::new("md2pdf")
    }
}

impl CommandConverter {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl Converter for CommandConverter {
    async fn convert(&self, source: &Path, destination: &Path) -> bool {
        tracing::debug!(
            "Running {} {} {}",
            self.command,
            source.display(),
            destination.display()
        );

        match Command::new(&self.command)
            .arg(source)
            .arg(destination)
            .status()
            .await
        {
            Ok(status) if status.success() => {
                tracing::info!("Converted {} -> {}", source.display(), destination.display());
                true
            }
            Ok(status) => {
                tracing::error!("{} failed for {}: {}", self.command, source.display(), status);
                false
            }
            Err(e) => {
                tracing::error!("Could not run {}: {}", self.command, e);
                false
            }
        }
    }
}

/// Converter that does nothing, for runs with conversion turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopConverter;

#[async_trait]
impl Converter for NoopConverter {
    async fn convert(&self, _source: &Path, _destination: &Path) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_markdown_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pubmed.md");
        let record: Record = [("title", "T"), ("link", "L")].into_iter().collect();

        write_markdown(&[record], &path, "PubMed").unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# PubMed (1 entries)"));
        assert!(written.contains("[View Article](L)"));
    }

    #[test]
    fn test_pdf_path() {
        assert_eq!(
            pdf_path(Path::new("/tmp/feeds/arxiv_org_20240101_08.md")),
            PathBuf::from("/tmp/feeds/arxiv_org_20240101_08.pdf")
        );
    }

    #[tokio::test]
    async fn test_missing_converter_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let converter = CommandConverter::new("paperfeed-no-such-converter");
        let ok = converter
            .convert(&dir.path().join("a.md"), &dir.path().join("a.pdf"))
            .await;
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_noop_converter() {
        assert!(!NoopConverter.convert(Path::new("a.md"), Path::new("a.pdf")).await);
    }
}
