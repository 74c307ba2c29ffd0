use std::collections::HashMap;

/// A parsed syndication document: an optional channel title plus its entries
/// in document order.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    pub title: Option<String>,
    pub entries: Vec<Entry>,
}

impl Feed {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            title: None,
            entries,
        }
    }

    pub fn first_entry(&self) -> Option<&Entry> {
        self.entries.first()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Value of a single entry attribute.
///
/// Most attributes are plain text. Structured attributes (`authors`,
/// `content`, `tags`) hold a list of nested attribute bags, e.g. one
/// `{name, email}` bag per author.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    List(Vec<Entry>),
}

impl Value {
    /// Flatten the value to display text.
    ///
    /// Lists render each nested bag by its most descriptive key
    /// (`name`, `value`, `term`, `href`), joined with `", "`.
    pub fn to_text(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::List(items) => items
                .iter()
                .filter_map(|item| {
                    ["name", "value", "term", "href"]
                        .iter()
                        .find_map(|key| item.text(key))
                })
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// One feed item as a sparse bag of named attributes.
///
/// Feeds from different providers expose different, partially overlapping
/// attribute sets, so nothing here is guaranteed to be present. Every read
/// goes through [`Entry::get`] or one of its text helpers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
    attrs: HashMap<String, Value>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style text attribute setter, mostly for tests and adapters.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_text(name, value);
        self
    }

    /// Builder-style list attribute setter.
    pub fn with_list(mut self, name: impl Into<String>, items: Vec<Entry>) -> Self {
        self.set(name, Value::List(items));
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.attrs.insert(name.into(), value);
    }

    pub fn set_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set(name, Value::Text(value.into()));
    }

    /// Set a text attribute only if the entry does not already carry it.
    pub fn set_text_if_absent(&mut self, name: &str, value: impl Into<String>) {
        if !self.has(name) {
            self.set_text(name, value);
        }
    }

    /// Append a nested bag to a list attribute, creating the list if needed.
    /// A text value under the same name is replaced.
    pub fn push_item(&mut self, name: &str, item: Entry) {
        match self.attrs.get_mut(name) {
            Some(Value::List(items)) => items.push(item),
            _ => self.set(name, Value::List(vec![item])),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// The attribute as text, only if it is stored as text.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.attrs.get(name) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The attribute as a list of nested bags, only if it is stored as a list.
    pub fn list(&self, name: &str) -> Option<&[Entry]> {
        match self.attrs.get(name) {
            Some(Value::List(items)) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Read an attribute as display text, or `default` when absent.
    pub fn text_or(&self, name: &str, default: &str) -> String {
        self.attrs
            .get(name)
            .map(Value::to_text)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}
