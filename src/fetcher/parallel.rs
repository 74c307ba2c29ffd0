use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::app::{PaperfeedError, Result};
use crate::domain::Feed;
use crate::fetcher::Fetcher;

pub const DEFAULT_WORKERS: usize = 4;

/// Fetches many feeds concurrently with a bounded number of requests in
/// flight. Results come back in input order.
pub struct ParallelFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    semaphore: Arc<Semaphore>,
}

impl ParallelFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self::with_workers(fetcher, DEFAULT_WORKERS)
    }

    pub fn with_workers(fetcher: Arc<dyn Fetcher + Send + Sync>, workers: usize) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    pub async fn fetch_all(&self, urls: Vec<String>) -> Vec<(String, Result<Feed>)> {
        let mut handles = Vec::new();

        for url in urls {
            let fetcher = self.fetcher.clone();
            let semaphore = self.semaphore.clone();
            let task_url = url.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|e| PaperfeedError::Other(format!("Fetch pool closed: {}", e)))?;
                fetcher.fetch(&task_url).await
            });

            handles.push((url, handle));
        }

        let mut results = Vec::new();
        for (url, handle) in handles {
            match handle.await {
                Ok(result) => results.push((url, result)),
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                    results.push((url, Err(PaperfeedError::Other(format!("Fetch task failed: {}", e)))));
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::domain::Entry;

    struct EchoFetcher;

    #[async_trait]
    impl Fetcher for EchoFetcher {
        async fn fetch(&self, url: &str) -> Result<Feed> {
            if url.contains("broken") {
                return Err(PaperfeedError::FeedParse("bad document".into()));
            }
            Ok(Feed::new(vec![Entry::new().with("link", url)]))
        }
    }

    #[tokio::test]
    async fn test_fetch_all_preserves_order() {
        let pool = ParallelFetcher::with_workers(Arc::new(EchoFetcher), 2);
        let urls: Vec<String> = (0..5).map(|i| format!("https://example.com/{}", i)).collect();

        let results = pool.fetch_all(urls.clone()).await;

        assert_eq!(results.len(), 5);
        for ((url, result), expected) in results.iter().zip(&urls) {
            assert_eq!(url, expected);
            let feed = result.as_ref().unwrap();
            assert_eq!(feed.entries[0].text("link"), Some(expected.as_str()));
        }
    }

    #[tokio::test]
    async fn test_fetch_all_keeps_failures_per_url() {
        let pool = ParallelFetcher::new(Arc::new(EchoFetcher));
        let results = pool
            .fetch_all(vec!["https://broken.example".into(), "https://ok.example".into()])
            .await;

        assert!(results[0].1.is_err());
        assert!(results[1].1.is_ok());
    }

    #[tokio::test]
    async fn test_zero_workers_still_progresses() {
        let pool = ParallelFetcher::with_workers(Arc::new(EchoFetcher), 0);
        let results = pool.fetch_all(vec!["https://example.com".into()]).await;
        assert!(results[0].1.is_ok());
    }
}
