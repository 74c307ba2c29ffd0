use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::parallel::ParallelFetcher;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::render::{CommandConverter, Converter, NoopConverter};
use crate::summarizer::{OllamaSummarizer, Summarizer};

pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub parallel_fetcher: ParallelFetcher,
    pub normalizer: Normalizer,
    pub summarizer: Arc<dyn Summarizer + Send + Sync>,
    pub converter: Arc<dyn Converter + Send + Sync>,
}

impl AppContext {
    /// Wire up the HTTP fetcher, Ollama and the configured converter.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new()?);
        let summarizer: Arc<dyn Summarizer + Send + Sync> = Arc::new(OllamaSummarizer::new(
            config.summary.ollama_command.clone(),
            config.summary.model.clone(),
            config.summary.merge_model.clone(),
        ));
        let converter: Arc<dyn Converter + Send + Sync> = if config.convert.enabled {
            Arc::new(CommandConverter::new(config.convert.command.clone()))
        } else {
            Arc::new(NoopConverter)
        };

        Self::with_components(config, fetcher, summarizer, converter)
    }

    /// Build a context around caller-supplied collaborators.
    ///
    /// Custom sources from `config` are registered with the normalizer, so an
    /// invalid custom source fails here.
    pub fn with_components(
        config: Config,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        summarizer: Arc<dyn Summarizer + Send + Sync>,
        converter: Arc<dyn Converter + Send + Sync>,
    ) -> Result<Self> {
        let mut normalizer = Normalizer::new();
        config.register_custom_sources(&mut normalizer)?;

        let parallel_fetcher = ParallelFetcher::with_workers(fetcher.clone(), config.workers);

        Ok(Self {
            config,
            fetcher,
            parallel_fetcher,
            normalizer,
            summarizer,
            converter,
        })
    }

    /// Stop converting output documents, e.g. for `fetch --no-convert`.
    pub fn disable_conversion(&mut self) {
        self.converter = Arc::new(NoopConverter);
    }
}
