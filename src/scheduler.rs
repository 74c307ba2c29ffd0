//! Periodic batch runs in the foreground.
//!
//! Runs the batch job on start and then once per interval until SIGINT or
//! SIGTERM (Ctrl-C on Windows).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::app::job::run_job;
use crate::app::AppContext;

/// Longest accepted interval: one year.
const MAX_INTERVAL_SECS: u64 = 365 * 86400;

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Interval between runs in seconds (default: 43200 = 12 hours)
    pub interval_secs: u64,
    /// Whether to run the job immediately on start
    pub run_on_start: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: 12 * 3600,
            run_on_start: true,
        }
    }
}

impl ScheduleConfig {
    /// Parse interval string like "12h", "30m", "1d", "90s" or raw seconds.
    pub fn parse_interval(s: &str) -> Result<u64, String> {
        let s = s.trim().to_lowercase();

        let (digits, unit, multiplier) = if let Some(hours) = s.strip_suffix('h') {
            (hours, "hours", 3600)
        } else if let Some(minutes) = s.strip_suffix('m') {
            (minutes, "minutes", 60)
        } else if let Some(days) = s.strip_suffix('d') {
            (days, "days", 86400)
        } else if let Some(secs) = s.strip_suffix('s') {
            (secs, "seconds", 1)
        } else {
            (s.as_str(), "interval", 1)
        };

        let secs = digits
            .parse::<u64>()
            .map_err(|_| format!("Invalid {}: {}. Use format like '12h', '30m', '1d'", unit, digits))?
            .checked_mul(multiplier)
            .filter(|secs| *secs <= MAX_INTERVAL_SECS)
            .ok_or_else(|| format!("Interval too large: {} (at most 365d)", s))?;

        Self::nonzero(secs)
    }

    fn nonzero(secs: u64) -> Result<u64, String> {
        if secs == 0 {
            return Err("Interval must be greater than zero".to_string());
        }
        Ok(secs)
    }

    /// Format interval for display
    pub fn format_interval(secs: u64) -> String {
        if secs >= 86400 && secs.is_multiple_of(86400) {
            format!("{}d", secs / 86400)
        } else if secs >= 3600 && secs.is_multiple_of(3600) {
            format!("{}h", secs / 3600)
        } else if secs >= 60 && secs.is_multiple_of(60) {
            format!("{}m", secs / 60)
        } else {
            format!("{}s", secs)
        }
    }
}

pub struct Scheduler {
    ctx: Arc<AppContext>,
    config: ScheduleConfig,
    shutdown: watch::Sender<bool>,
}

impl Scheduler {
    pub fn new(ctx: Arc<AppContext>, config: ScheduleConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            ctx,
            config,
            shutdown,
        }
    }

    /// Run until stopped by a signal or [`Scheduler::stop`].
    pub async fn run(&self) -> crate::app::Result<()> {
        let mut stopped = self.shutdown.subscribe();
        self.listen_for_signals();

        tracing::info!(
            "Scheduler started (interval: {})",
            ScheduleConfig::format_interval(self.config.interval_secs)
        );

        if self.config.run_on_start {
            tracing::info!("Running initial job...");
            self.run_once().await;
        }

        let mut timer = interval(Duration::from_secs(self.config.interval_secs));
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer.tick().await; // first tick completes immediately

        while !*stopped.borrow() {
            tokio::select! {
                _ = timer.tick() => {
                    tracing::info!("Running scheduled job...");
                    self.run_once().await;
                }
                _ = stopped.changed() => {}
            }
        }

        tracing::info!("Scheduler shutting down...");
        Ok(())
    }

    pub fn stop(&self) {
        self.shutdown.send_replace(true);
    }

    fn listen_for_signals(&self) {
        let shutdown = self.shutdown.clone();

        #[cfg(unix)]
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};

            let (mut sigterm, mut sigint) =
                match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                    (Ok(term), Ok(int)) => (term, int),
                    (Err(e), _) | (_, Err(e)) => {
                        tracing::error!("Failed to set up signal handlers: {}", e);
                        return;
                    }
                };

            tokio::select! {
                _ = sigterm.recv() => {},
                _ = sigint.recv() => {},
            }
            shutdown.send_replace(true);
        });

        #[cfg(windows)]
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            shutdown.send_replace(true);
        });
    }

    async fn run_once(&self) {
        let start = Utc::now();

        match run_job(&self.ctx).await {
            Ok(report) => {
                let elapsed = Utc::now().signed_duration_since(start);
                tracing::info!(
                    "Job finished in {:.1}s: {} sources ok, {} failed, output in {}",
                    elapsed.num_milliseconds() as f64 / 1000.0,
                    report.succeeded,
                    report.failed,
                    report.output_dir.display()
                );
            }
            Err(e) => tracing::error!("Job failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::render::NoopConverter;
    use crate::summarizer::OllamaSummarizer;

    #[test]
    fn test_parse_interval() {
        assert_eq!(ScheduleConfig::parse_interval("1h").unwrap(), 3600);
        assert_eq!(ScheduleConfig::parse_interval("30m").unwrap(), 1800);
        assert_eq!(ScheduleConfig::parse_interval("1d").unwrap(), 86400);
        assert_eq!(ScheduleConfig::parse_interval("60s").unwrap(), 60);
        assert_eq!(ScheduleConfig::parse_interval("3600").unwrap(), 3600);
        assert_eq!(ScheduleConfig::parse_interval(" 12H ").unwrap(), 43200);
        assert!(ScheduleConfig::parse_interval("invalid").is_err());
        assert!(ScheduleConfig::parse_interval("0h").is_err());
    }

    #[test]
    fn test_parse_interval_rejects_overflow() {
        let err = ScheduleConfig::parse_interval("99999999999999999h").unwrap_err();
        assert!(err.contains("too large"));
        assert!(ScheduleConfig::parse_interval("999999999999999999d").is_err());
        assert!(ScheduleConfig::parse_interval("18446744073709551615").is_err());
        assert_eq!(ScheduleConfig::parse_interval("365d").unwrap(), 365 * 86400);
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(ScheduleConfig::format_interval(3600), "1h");
        assert_eq!(ScheduleConfig::format_interval(1800), "30m");
        assert_eq!(ScheduleConfig::format_interval(86400), "1d");
        assert_eq!(ScheduleConfig::format_interval(90), "90s");
        assert_eq!(ScheduleConfig::format_interval(43200), "12h");
    }

    #[tokio::test]
    async fn test_stopped_scheduler_runs_initial_job_and_exits() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.output_dir = Some(dir.path().to_path_buf());

        let fetcher = Arc::new(crate::fetcher::http_fetcher::HttpFetcher::new().unwrap());
        let ctx = AppContext::with_components(
            config,
            fetcher,
            Arc::new(OllamaSummarizer::default()),
            Arc::new(NoopConverter),
        )
        .unwrap();

        let scheduler = Scheduler::new(Arc::new(ctx), ScheduleConfig::default());
        scheduler.stop();

        tokio::time::timeout(Duration::from_secs(5), scheduler.run())
            .await
            .expect("scheduler should exit once stopped")
            .unwrap();

        let runs: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(runs.len(), 1);
    }
}
