pub mod builtin;
pub mod detect;
pub mod generic;
pub mod registry;
pub mod source;

pub use detect::{detect_source, SourceType};
pub use generic::generic_config;
pub use registry::SourceRegistry;
pub use source::{FieldExtractor, SourceConfig};

use serde::Serialize;

use crate::domain::{Feed, Record};

/// How the caller wants the extraction configuration chosen.
#[derive(Debug, Clone, Default)]
pub enum Selection {
    /// Use this configuration as-is.
    Custom(SourceConfig),
    /// Use the registered configuration with this name, falling back to
    /// detection if the name is unknown.
    Hint(String),
    /// Detect the source type from the feed.
    #[default]
    Auto,
}

impl Selection {
    /// `Hint` when a source type was given, `Auto` otherwise.
    pub fn from_hint(hint: Option<&str>) -> Self {
        match hint {
            Some(name) => Selection::Hint(name.to_string()),
            None => Selection::Auto,
        }
    }
}

/// Records produced from one feed, plus the display name of the
/// configuration that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedFeed {
    pub feed_name: String,
    pub records: Vec<Record>,
}

/// Maps weakly-typed feed entries onto uniform records using per-source
/// extraction rules.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    registry: SourceRegistry,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::with_registry(SourceRegistry::new())
    }

    pub fn with_registry(registry: SourceRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Register (or replace) a named configuration for later hints.
    pub fn register(&mut self, name: impl Into<String>, config: SourceConfig) {
        self.registry.register(name, config);
    }

    /// Pick the configuration for `feed`.
    ///
    /// Precedence: custom config, registered hint, detected built-in, then a
    /// synthesized generic config. Never fails.
    pub fn resolve(&self, feed: &Feed, selection: &Selection) -> SourceConfig {
        match selection {
            Selection::Custom(config) => return config.clone(),
            Selection::Hint(name) => {
                if let Some(config) = self.registry.lookup(name) {
                    return config.clone();
                }
                tracing::debug!("Source type '{}' is not registered, detecting instead", name);
            }
            Selection::Auto => {}
        }

        let detected = detect_source(feed);
        match self.registry.lookup(detected.as_str()) {
            Some(config) => {
                tracing::debug!("Detected source type '{}'", detected);
                config.clone()
            }
            None => {
                tracing::debug!("No configuration for '{}', using generic fields", detected);
                generic_config(feed)
            }
        }
    }

    /// Apply `config` to every entry of `feed`, in feed order.
    ///
    /// Every record has a `title`: configurations without one get the
    /// entry's `title` attribute (possibly empty) as the first field.
    pub fn apply(feed: &Feed, config: &SourceConfig) -> Vec<Record> {
        let implicit_title = config.extractor("title").is_none();

        feed.entries
            .iter()
            .map(|entry| {
                let title = implicit_title.then(|| ("title", entry.text_or("title", "")));
                title
                    .into_iter()
                    .chain(
                        config
                            .fields()
                            .map(|(name, extractor)| (name, extractor.extract(entry))),
                    )
                    .collect::<Record>()
            })
            .collect()
    }

    /// Resolve a configuration and apply it.
    pub fn normalize(&self, feed: &Feed, selection: &Selection) -> NormalizedFeed {
        let config = self.resolve(feed, selection);
        let records = Self::apply(feed, &config);

        NormalizedFeed {
            feed_name: config.feed_name,
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Entry;

    fn arxiv_feed() -> Feed {
        Feed::new(vec![
            Entry::new()
                .with("title", "Paper One")
                .with("link", "https://arxiv.org/abs/1")
                .with("summary", "Abstract one")
                .with_list(
                    "authors",
                    vec![
                        Entry::new().with("name", "Alice Smith"),
                        Entry::new().with("name", "Bob Lee"),
                    ],
                ),
            Entry::new()
                .with("title", "Paper Two")
                .with("link", "https://arxiv.org/abs/2"),
        ])
    }

    #[test]
    fn test_empty_feed_yields_no_records() {
        let normalizer = Normalizer::new();
        for selection in [Selection::Auto, Selection::Hint("arxiv".into())] {
            let result = normalizer.normalize(&Feed::default(), &selection);
            assert!(result.records.is_empty());
        }
    }

    #[test]
    fn test_auto_detects_arxiv() {
        let normalizer = Normalizer::new();
        let result = normalizer.normalize(&arxiv_feed(), &Selection::Auto);

        assert_eq!(result.feed_name, "arXiv");
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].get("authors"), Some("Alice Smith, Bob Lee"));
        assert_eq!(result.records[1].get("authors"), Some("N/A"));
        assert_eq!(result.records[1].get("summary"), Some(""));
        assert_eq!(
            result.records[0].field_names(),
            vec!["title", "authors", "summary", "link"]
        );
    }

    #[test]
    fn test_custom_config_wins_over_hint() {
        let normalizer = Normalizer::new();
        let custom = SourceConfig::new("Custom")
            .field("title", "title")
            .field("date", "published")
            .field("content", "summary");
        let result = normalizer.normalize(&arxiv_feed(), &Selection::Custom(custom));

        assert_eq!(result.feed_name, "Custom");
        assert_eq!(result.records[0].field_names(), vec!["title", "date", "content"]);
        assert_eq!(result.records[0].get("content"), Some("Abstract one"));
    }

    #[test]
    fn test_record_always_has_title() {
        let normalizer = Normalizer::new();
        let feed = Feed::new(vec![
            Entry::new().with("summary", "Body only"),
            Entry::new().with("title", "Late title").with("summary", "Body"),
        ]);

        let generic = normalizer.normalize(&feed, &Selection::Auto);
        assert_eq!(generic.records[0].field_names(), vec!["title", "summary"]);
        assert_eq!(generic.records[0].get("title"), Some(""));
        assert_eq!(generic.records[1].get("title"), Some("Late title"));

        let custom = SourceConfig::new("Bodies").field("body", "summary");
        let result = normalizer.normalize(&feed, &Selection::Custom(custom));
        assert_eq!(result.records[0].field_names(), vec!["title", "body"]);
        assert_eq!(crate::format::render_text(&result.records[..1]), "[0] Title: N/A\nBody: Body only");
    }

    #[test]
    fn test_hint_overrides_detection() {
        let normalizer = Normalizer::new();
        let result = normalizer.normalize(&arxiv_feed(), &Selection::Hint("pubmed".into()));
        assert_eq!(result.feed_name, "PubMed");
        assert_eq!(result.records[0].get("pub_date"), Some(""));
    }

    #[test]
    fn test_unknown_hint_falls_back_to_detection() {
        let normalizer = Normalizer::new();
        let result = normalizer.normalize(&arxiv_feed(), &Selection::Hint("news".into()));
        assert_eq!(result.feed_name, "arXiv");
    }

    #[test]
    fn test_generic_fallback() {
        let normalizer = Normalizer::new();
        let feed = Feed::new(vec![
            Entry::new().with("title", "Headline").with("summary", "Body"),
            Entry::new().with("title", "Second").with("link", "https://example.com/2"),
        ]);
        let result = normalizer.normalize(&feed, &Selection::Auto);

        assert_eq!(result.feed_name, "Generic RSS");
        assert_eq!(result.records[0].field_names(), vec!["title", "summary"]);
        // Second entry is shaped by the first entry's schema.
        assert_eq!(result.records[1].field_names(), vec!["title", "summary"]);
        assert_eq!(result.records[1].get("summary"), Some(""));
    }

    #[test]
    fn test_registered_source_is_used_by_hint() {
        let mut normalizer = Normalizer::new();
        let feed = Feed::new(vec![Entry::new()
            .with("title", "Item")
            .with("link", "https://www.nature.com/articles/x")
            .with("prism_doi", "10.1038/x")]);

        let before = normalizer.normalize(&feed, &Selection::Hint("journal".into()));
        assert_eq!(before.feed_name, "Generic RSS");

        normalizer.register(
            "journal",
            SourceConfig::new("Journal")
                .field("title", "title")
                .field("doi", FieldExtractor::first_of(["prism_doi", "id"], "N/A")),
        );
        let after = normalizer.normalize(&feed, &Selection::Hint("journal".into()));
        assert_eq!(after.feed_name, "Journal");
        assert_eq!(after.records[0].get("doi"), Some("10.1038/x"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let normalizer = Normalizer::new();
        let feed = arxiv_feed();
        let first = normalizer.normalize(&feed, &Selection::Auto);
        let second = normalizer.normalize(&feed, &Selection::Auto);
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_entries_preserved() {
        let normalizer = Normalizer::new();
        let entry = Entry::new().with("title", "Same").with("link", "https://pubmed.ncbi.nlm.nih.gov/1/");
        let feed = Feed::new(vec![entry.clone(), entry]);
        let result = normalizer.normalize(&feed, &Selection::Auto);
        assert_eq!(result.feed_name, "PubMed");
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0], result.records[1]);
    }

    #[test]
    fn test_selection_from_hint() {
        assert!(matches!(Selection::from_hint(None), Selection::Auto));
        assert!(matches!(Selection::from_hint(Some("wiley")), Selection::Hint(ref n) if n == "wiley"));
    }
}
