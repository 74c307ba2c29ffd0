pub mod http_fetcher;
pub mod parallel;
pub mod parser;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::Feed;

/// Retrieves and parses the feed at a URL.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Feed>;
}
