use std::fmt;

use crate::domain::{Entry, Feed};

/// Source families the detector can recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceType {
    Arxiv,
    Wiley,
    Pubmed,
    Generic,
}

impl SourceType {
    /// Registry name for this source type.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Arxiv => "arxiv",
            SourceType::Wiley => "wiley",
            SourceType::Pubmed => "pubmed",
            SourceType::Generic => "generic",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guess the source type of a feed from its first entry.
///
/// Rules are checked in order and the first match wins; arXiv goes first
/// because its entries may also carry attributes the later rules look for.
/// An empty feed is always `Generic`.
pub fn detect_source(feed: &Feed) -> SourceType {
    match feed.first_entry() {
        Some(entry) => detect_entry(entry),
        None => SourceType::Generic,
    }
}

pub fn detect_entry(entry: &Entry) -> SourceType {
    let link = entry.text_or("link", "");

    if entry.has("authors") || entry.has("author") || link.contains("arxiv.org") {
        SourceType::Arxiv
    } else if entry.has("dc_creator") || entry.has("dc_identifier") {
        SourceType::Wiley
    } else if link.contains("pubmed.ncbi.nlm.nih.gov") {
        SourceType::Pubmed
    } else {
        SourceType::Generic
    }
}
