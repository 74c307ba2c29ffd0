use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use paperfeed::app::AppContext;
use paperfeed::cli::{commands, Cli, Commands};
use paperfeed::config::Config;
use paperfeed::scheduler::{ScheduleConfig, Scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    let mut ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Fetch {
            url,
            source_type,
            format,
            output,
            no_convert,
        } => {
            if no_convert {
                ctx.disable_conversion();
            }
            commands::fetch(&ctx, &url, source_type.as_deref(), format, output.as_deref()).await?;
        }
        Commands::Detect { url } => {
            commands::detect(&ctx, &url).await?;
        }
        Commands::Sources => {
            commands::list_sources(&ctx);
        }
        Commands::Run => {
            commands::run(&ctx).await?;
        }
        Commands::Schedule {
            interval,
            no_initial_run,
        } => {
            let interval_secs = ScheduleConfig::parse_interval(&interval).map_err(anyhow::Error::msg)?;
            let config = ScheduleConfig {
                interval_secs,
                run_on_start: !no_initial_run,
            };
            Scheduler::new(Arc::new(ctx), config).run().await?;
        }
    }

    Ok(())
}
