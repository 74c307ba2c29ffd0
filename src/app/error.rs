use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaperfeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Summarizer error: {0}")]
    Summarizer(String),

    #[error("{0}")]
    Other(String),
}

impl From<crate::config::ConfigError> for PaperfeedError {
    fn from(e: crate::config::ConfigError) -> Self {
        PaperfeedError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PaperfeedError>;
