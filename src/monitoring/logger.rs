use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::MonitoringConfig;

/// Install the global JSON subscriber. `RUST_LOG` wins over the configured
/// level.
///
/// Every per-region outcome of a cycle (fetch, parse and validation
/// failures, stale forecasts) is reported only through this subscriber, so
/// a typo in `log_level` or a subscriber already installed by an embedding
/// process is a startup error rather than a silently mute aggregator.
pub fn init_logging(config: &MonitoringConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}
