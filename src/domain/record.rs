use serde::ser::{Serialize, SerializeMap, Serializer};

/// Uniform output of applying an extraction configuration to one entry.
///
/// Field order follows the configuration that produced it, which keeps
/// rendering stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing the value in place if the name already exists.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    /// Title for display, or `placeholder` when it is missing or empty.
    pub fn display_title<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.title().filter(|t| !t.is_empty()).unwrap_or(placeholder)
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title() {
        let titled: Record = [("title", "T")].into_iter().collect();
        let empty: Record = [("title", "")].into_iter().collect();
        assert_eq!(titled.display_title("N/A"), "T");
        assert_eq!(empty.display_title("N/A"), "N/A");
        assert_eq!(Record::new().display_title("No Title"), "No Title");
    }

    #[test]
    fn test_insert_preserves_order() {
        let record: Record = [("title", "T"), ("summary", "S"), ("link", "L")]
            .into_iter()
            .collect();
        assert_eq!(record.field_names(), vec!["title", "summary", "link"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = Record::new();
        record.insert("title", "Old");
        record.insert("link", "L");
        record.insert("title", "New");
        assert_eq!(record.field_names(), vec!["title", "link"]);
        assert_eq!(record.title(), Some("New"));
    }

    #[test]
    fn test_serialize_keeps_field_order() {
        let record: Record = [("title", "T"), ("authors", "A"), ("doi", "D")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"title":"T","authors":"A","doi":"D"}"#);
    }
}
