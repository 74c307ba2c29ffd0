use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::app::{PaperfeedError, Result};
use crate::domain::Feed;
use crate::fetcher::parser::parse_feed;
use crate::fetcher::Fetcher;

const TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("paperfeed/", env!("CARGO_PKG_VERSION"));

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .gzip(true)
            .brotli(true)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch the raw document body.
    pub async fn fetch_body(&self, url: &str) -> Result<Vec<u8>> {
        let url = validate_url(url)?;

        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Feed> {
        let body = self.fetch_body(url).await?;
        let feed = parse_feed(&body)?;
        tracing::debug!("Fetched {} entries from {}", feed.entries.len(), url);
        Ok(feed)
    }
}

/// Only http(s) URLs are fetched.
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url)?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(PaperfeedError::Other(format!(
            "Unsupported URL scheme '{}' in {}",
            scheme, url
        ))),
    }
}
