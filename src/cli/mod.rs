pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "paperfeed")]
#[command(about = "Fetch research paper feeds into uniform digests", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/paperfeed/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of parallel workers for fetching feeds
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one feed and print or save its digest
    Fetch {
        /// URL of the feed
        url: String,

        /// Registered source type (detected when omitted)
        #[arg(short, long)]
        source_type: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Don't convert saved markdown to PDF
        #[arg(long)]
        no_convert: bool,
    },
    /// Show which source type a feed is detected as
    Detect {
        /// URL of the feed
        url: String,
    },
    /// List registered source types
    Sources,
    /// Run the batch job once for all configured sources
    Run,
    /// Run the batch job periodically in the foreground
    Schedule {
        /// Interval between runs (e.g., "12h", "30m", "1d")
        #[arg(short, long, default_value = "12h")]
        interval: String,

        /// Skip the run on start
        #[arg(long)]
        no_initial_run: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Markdown,
    Html,
    Json,
}
