use std::collections::HashMap;

use crate::normalizer::builtin;
use crate::normalizer::SourceConfig;

/// Named extraction configurations known to one normalizer.
///
/// Owned per instance; callers that want several normalizers to see the same
/// registrations must share a single normalizer.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    configs: HashMap<String, SourceConfig>,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceRegistry {
    /// Registry pre-populated with the built-in sources.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for (name, config) in builtin::configs() {
            registry.register(name, config);
        }
        registry
    }

    pub fn empty() -> Self {
        Self {
            configs: HashMap::new(),
        }
    }

    /// Insert or overwrite the configuration for `name`.
    pub fn register(&mut self, name: impl Into<String>, config: SourceConfig) {
        let name = name.into();
        if self.configs.insert(name.clone(), config).is_some() {
            tracing::debug!("Replaced source configuration '{}'", name);
        } else {
            tracing::debug!("Registered source configuration '{}'", name);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&SourceConfig> {
        self.configs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.configs.contains_key(name)
    }

    /// Registered names, sorted for display.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.configs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
