//! Configuration management for paperfeed.
//!
//! Configuration is read from `~/.config/paperfeed/config.toml` at startup
//! (or from `--config <path>`). If the default file doesn't exist, a default
//! configuration with comments is created.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::fetcher::parallel::DEFAULT_WORKERS;
use crate::normalizer::{builtin, FieldExtractor, Normalizer, SourceConfig};
use crate::summarizer::ollama::DEFAULT_MODEL;
use crate::summarizer::DEFAULT_PROMPT;

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory for per-run output folders.
    pub output_dir: Option<PathBuf>,
    /// Concurrent fetches during batch runs.
    pub workers: usize,
    pub summary: SummaryConfig,
    pub convert: ConvertConfig,
    pub sources: Vec<FeedSource>,
    pub custom_sources: Vec<CustomSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: None,
            workers: DEFAULT_WORKERS,
            summary: SummaryConfig::default(),
            convert: ConvertConfig::default(),
            sources: Vec::new(),
            custom_sources: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub enabled: bool,
    pub ollama_command: String,
    pub model: String,
    pub merge_model: String,
    pub iterations: usize,
    pub prompt: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ollama_command: "ollama".to_string(),
            model: DEFAULT_MODEL.to_string(),
            merge_model: DEFAULT_MODEL.to_string(),
            iterations: 3,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub enabled: bool,
    pub command: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "md2pdf".to_string(),
        }
    }
}

/// A feed processed by `run` and `schedule`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSource {
    /// Short name used in output file names.
    pub name: String,
    pub url: String,
    /// Registered source type; detected from the feed when omitted.
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default = "default_true")]
    pub summarize: bool,
}

/// A source type defined in the config file and registered at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomSource {
    pub name: String,
    pub feed_name: String,
    pub fields: Vec<FieldRule>,
}

/// One output field of a custom source. Exactly one of `attribute`,
/// `derived` or `first_of` must be set.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldRule {
    pub name: String,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub derived: Option<String>,
    #[serde(default)]
    pub first_of: Option<Vec<String>>,
    #[serde(default)]
    pub default: Option<String>,
}

fn default_true() -> bool {
    true
}

impl FieldRule {
    fn to_extractor(&self, source: &str) -> Result<FieldExtractor, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidSource {
            source_name: source.to_string(),
            reason,
        };

        match (&self.attribute, &self.derived, &self.first_of) {
            (Some(attribute), None, None) => Ok(FieldExtractor::attribute(attribute.clone())),
            (None, Some(derived), None) => builtin::derived_by_name(derived)
                .ok_or_else(|| invalid(format!("unknown derived extractor '{}'", derived))),
            (None, None, Some(names)) => Ok(FieldExtractor::first_of(
                names.clone(),
                self.default.clone().unwrap_or_default(),
            )),
            _ => Err(invalid(format!(
                "field '{}' needs exactly one of attribute, derived, first_of",
                self.name
            ))),
        }
    }
}

impl CustomSource {
    pub fn to_source_config(&self) -> Result<SourceConfig, ConfigError> {
        let mut config = SourceConfig::new(self.feed_name.clone());
        for rule in &self.fields {
            config.set_field(rule.name.clone(), rule.to_extractor(&self.name)?);
        }
        Ok(config)
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing default file is created with commented defaults. An explicit
    /// path must exist. Missing fields use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: config_path,
                source,
            },
            other => other,
        })
    }

    /// Parse configuration text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/paperfeed/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("paperfeed").join("config.toml"))
    }

    /// Output root: the configured directory, or the user data directory.
    pub fn output_root(&self) -> Result<PathBuf, ConfigError> {
        match &self.output_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|d| d.join("paperfeed").join("feeds"))
                .ok_or(ConfigError::NoDataDir),
        }
    }

    /// Register every custom source with `normalizer`.
    pub fn register_custom_sources(&self, normalizer: &mut Normalizer) -> Result<(), ConfigError> {
        for custom in &self.custom_sources {
            normalizer.register(custom.name.clone(), custom.to_source_config()?);
        }
        Ok(())
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> &'static str {
        r##"# paperfeed configuration
#
# Built-in source types: pubmed, arxiv, wiley, nature.
# Feeds without a source_type are detected from their first entry.

# Root directory for run output (default: <data dir>/paperfeed/feeds)
# output_dir = "/path/to/feeds"

# Concurrent feed downloads during `run` and `schedule`
workers = 4

[summary]
enabled = true
ollama_command = "ollama"
model = "deepseek-r1:70b"
merge_model = "deepseek-r1:70b"
# Draft passes before the merge pass
iterations = 3

[convert]
# Converts each markdown file to <name>.pdf
enabled = true
command = "md2pdf"

# Feeds processed by `paperfeed run`
#
# [[sources]]
# name = "arxiv_cs_ai"
# url = "https://export.arxiv.org/rss/cs.AI"
# source_type = "arxiv"
#
# [[sources]]
# name = "pubmed"
# url = "https://pubmed.ncbi.nlm.nih.gov/rss/search/<id>/?limit=100"
# source_type = "pubmed"

# Extra source types, usable as source_type above or with --source-type.
# A field reads an attribute, a built-in derived extractor
# (arxiv_authors, wiley_abstract), or the first present of several attributes.
#
# [[custom_sources]]
# name = "journal"
# feed_name = "My Journal"
# fields = [
#     { name = "title", attribute = "title" },
#     { name = "authors", derived = "arxiv_authors" },
#     { name = "doi", first_of = ["prism_doi", "id"], default = "N/A" },
#     { name = "link", attribute = "link" },
# ]
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Could not determine data directory")]
    NoDataDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid custom source '{source_name}': {reason}")]
    InvalidSource { source_name: String, reason: String },
}
