//! # Paperfeed
//!
//! Fetches research-paper RSS/Atom feeds, maps each publisher's entries onto
//! a uniform record shape, and writes digests for reading or summarizing.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Normalizer → Format → Render/Convert → Summarizer
//! ```
//!
//! - [`fetcher`]: HTTP client and RSS/RDF/Atom/JSON parsing into attribute bags
//! - [`normalizer`]: Source registry, auto-detection and field extraction
//! - [`format`]: Text, markdown and HTML rendering of records
//! - [`summarizer`]: Multi-pass LLM summaries through Ollama
//!
//! ## Quick Start
//!
//! ```bash
//! # Print an arXiv listing as text
//! paperfeed fetch https://export.arxiv.org/rss/cs.AI
//!
//! # Save a markdown digest (and PDF)
//! paperfeed fetch https://export.arxiv.org/rss/cs.AI -f markdown -o cs_ai.md
//!
//! # Run every configured source, every 12 hours
//! paperfeed schedule --interval 12h
//! ```

/// Application context, batch job and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// fetcher, normalizer, summarizer, converter.
pub mod app;

/// Command-line interface using clap.
///
/// - `fetch <url>` - Print or save one feed's digest
/// - `detect <url>` - Show the detected source type
/// - `sources` - List registered source types
/// - `run` - Run the batch job once
/// - `schedule` - Run the batch job periodically
pub mod cli;

/// Configuration loaded from `~/.config/paperfeed/config.toml`.
pub mod config;

/// Core data: parsed [`Feed`](domain::Feed)s of attribute-bag
/// [`Entry`](domain::Entry)s, and normalized [`Record`](domain::Record)s.
pub mod domain;

/// HTTP fetching and feed parsing.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for feed fetching
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`ParallelFetcher`](fetcher::parallel::ParallelFetcher): Concurrent fetching with semaphore
pub mod fetcher;

/// Plain-text, markdown and HTML rendering of normalized records.
pub mod format;

/// Per-source field extraction.
///
/// Turns a parsed feed into uniform records using a registered, detected,
/// or synthesized [`SourceConfig`](normalizer::SourceConfig).
pub mod normalizer;

/// Writing digests to disk and converting them to PDF.
pub mod render;

/// Periodic batch runs until interrupted.
pub mod scheduler;

/// LLM summarization of digests.
pub mod summarizer;
