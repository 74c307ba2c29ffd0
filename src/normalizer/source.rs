use std::fmt;
use std::sync::Arc;

use crate::domain::Entry;

/// Signature of a computed field.
pub type DeriveFn = dyn Fn(&Entry) -> String + Send + Sync;

/// Rule producing one output field from an entry.
#[derive(Clone)]
pub enum FieldExtractor {
    /// Read the named attribute directly; absent means empty.
    Attribute(String),
    /// Compute the value from the whole entry.
    Derived(Arc<DeriveFn>),
}

impl FieldExtractor {
    pub fn attribute(name: impl Into<String>) -> Self {
        FieldExtractor::Attribute(name.into())
    }

    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&Entry) -> String + Send + Sync + 'static,
    {
        FieldExtractor::Derived(Arc::new(f))
    }

    /// Value of the first attribute in `names` the entry carries, else `default`.
    pub fn first_of<I, S>(names: I, default: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let default = default.into();
        Self::derived(move |entry| {
            names
                .iter()
                .find(|name| entry.has(name))
                .map(|name| entry.text_or(name, ""))
                .unwrap_or_else(|| default.clone())
        })
    }

    pub fn extract(&self, entry: &Entry) -> String {
        match self {
            FieldExtractor::Derived(f) => f(entry),
            FieldExtractor::Attribute(name) => entry.text_or(name, ""),
        }
    }
}

impl fmt::Debug for FieldExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldExtractor::Attribute(name) => f.debug_tuple("Attribute").field(name).finish(),
            FieldExtractor::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

impl From<&str> for FieldExtractor {
    fn from(name: &str) -> Self {
        FieldExtractor::attribute(name)
    }
}

impl From<String> for FieldExtractor {
    fn from(name: String) -> Self {
        FieldExtractor::Attribute(name)
    }
}

/// Extraction configuration for one source type: ordered field rules plus a
/// display name for rendered output.
#[derive(Debug, Clone, Default)]
pub struct SourceConfig {
    pub feed_name: String,
    fields: Vec<(String, FieldExtractor)>,
}

impl SourceConfig {
    pub fn new(feed_name: impl Into<String>) -> Self {
        Self {
            feed_name: feed_name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field rule. Re-using a name replaces the earlier rule but keeps
    /// its position.
    pub fn field(mut self, name: impl Into<String>, extractor: impl Into<FieldExtractor>) -> Self {
        self.set_field(name, extractor);
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, extractor: impl Into<FieldExtractor>) {
        let name = name.into();
        let extractor = extractor.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = extractor,
            None => self.fields.push((name, extractor)),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldExtractor)> {
        self.fields.iter().map(|(n, e)| (n.as_str(), e))
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn extractor(&self, name: &str) -> Option<&FieldExtractor> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, e)| e)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
