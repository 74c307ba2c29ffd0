//! Built-in source configurations and the derived extractors they rely on.

use scraper::{Html, Selector};

use crate::domain::Entry;
use crate::normalizer::{FieldExtractor, SourceConfig};

/// All built-in `(name, config)` pairs a fresh registry starts with.
pub fn configs() -> Vec<(&'static str, SourceConfig)> {
    vec![
        ("pubmed", pubmed()),
        ("arxiv", arxiv()),
        ("wiley", wiley()),
        ("nature", nature()),
    ]
}

pub fn pubmed() -> SourceConfig {
    SourceConfig::new("PubMed")
        .field("title", "title")
        .field("pub_date", "published")
        .field("summary", "summary")
        .field("link", "link")
}

pub fn arxiv() -> SourceConfig {
    SourceConfig::new("arXiv")
        .field("title", "title")
        .field("authors", FieldExtractor::derived(arxiv_authors))
        .field("summary", "summary")
        .field("link", "link")
}

pub fn wiley() -> SourceConfig {
    SourceConfig::new("Wiley")
        .field("title", "title")
        .field("authors", "dc_creator")
        .field("pub_date", "published")
        .field("doi", "dc_identifier")
        .field("link", "link")
        .field("abstract", FieldExtractor::derived(wiley_abstract))
}

pub fn nature() -> SourceConfig {
    SourceConfig::new("Nature Publishing Group")
        .field("title", "title")
        .field("authors", FieldExtractor::first_of(["author"], "N/A"))
        .field("pub_date", "published")
        .field("summary", "summary")
        .field("link", "link")
        .field("doi", FieldExtractor::first_of(["prism_doi", "id"], "N/A"))
}

/// Look up a derived extractor by the name configuration files use.
pub fn derived_by_name(name: &str) -> Option<FieldExtractor> {
    match name {
        "arxiv_authors" => Some(FieldExtractor::derived(arxiv_authors)),
        "wiley_abstract" => Some(FieldExtractor::derived(wiley_abstract)),
        _ => None,
    }
}

/// Author line for arXiv entries.
///
/// A structured `authors` list wins; its `name` values are joined with
/// `", "`. Otherwise the singular `author` is used as-is. arXiv's RSS
/// listings only carry `<dc:creator>`, which the parser keeps as
/// `dc_creator` rather than `author`, so that is tried last before `"N/A"`.
pub fn arxiv_authors(entry: &Entry) -> String {
    if let Some(authors) = entry.list("authors") {
        return authors
            .iter()
            .map(|author| author.text_or("name", ""))
            .collect::<Vec<_>>()
            .join(", ");
    }
    if entry.has("authors") {
        return entry.text_or("authors", "");
    }
    if entry.has("author") {
        return entry.text_or("author", "");
    }
    if entry.has("dc_creator") {
        return entry.text_or("dc_creator", "");
    }
    "N/A".to_string()
}

/// Plain-text abstract for Wiley entries.
///
/// Wiley ships the abstract as an HTML fragment in the first `content`
/// block. Paragraph texts are joined with blank lines; a fragment with no
/// paragraphs yields its whole text. Without a fragment the plain `summary`
/// is used.
pub fn wiley_abstract(entry: &Entry) -> String {
    let html = entry
        .list("content")
        .and_then(|blocks| blocks.first())
        .and_then(|block| block.text("value"))
        .unwrap_or("");

    if html.is_empty() {
        return entry.text_or("summary", "");
    }

    html_to_text(html)
}

/// Strip markup from an HTML fragment, keeping paragraph breaks.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);

    if let Ok(paragraph) = Selector::parse("p") {
        let paragraphs: Vec<String> = fragment
            .select(&paragraph)
            .map(|p| stripped_text(p.text()))
            .collect();
        if !paragraphs.is_empty() {
            return paragraphs.join("\n\n").trim().to_string();
        }
    }

    stripped_text(fragment.root_element().text())
}

// Trim each text node and concatenate without separators.
fn stripped_text<'a>(nodes: impl Iterator<Item = &'a str>) -> String {
    nodes.map(str::trim).collect()
}
