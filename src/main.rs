use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use avalanche_forecasts::aggregator::{Aggregator, ResultStore, Scheduler};
use avalanche_forecasts::config::AppConfig;
use avalanche_forecasts::data::HttpFeedSource;
use avalanche_forecasts::monitoring::logger;
use avalanche_forecasts::region::RegionCatalog;

#[derive(Debug, Parser)]
#[command(name = "avalanche-forecasts", about = "Aggregate regional avalanche forecasts")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config/default.toml")]
    config: PathBuf,

    /// Run a single cycle, publish, and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    logger::init_logging(&config.monitoring)?;

    info!(
        interval_s = config.aggregator.interval_seconds,
        max_concurrent_fetches = config.aggregator.max_concurrent_fetches,
        output = %config.output.path.display(),
        "Forecast aggregator starting"
    );

    // A bad catalog is fatal: there is nothing to aggregate without it.
    let catalog = RegionCatalog::load(&config.catalog.regions_path).with_context(|| {
        format!(
            "Failed to load region catalog: {}",
            config.catalog.regions_path.display()
        )
    })?;
    info!(regions = catalog.len(), "Region catalog loaded");

    let source = HttpFeedSource::new(config.fetch.timeout(), &config.fetch.user_agent)
        .context("Failed to build HTTP client")?;

    let aggregator = Arc::new(Aggregator::new(
        Arc::new(catalog),
        Arc::new(source),
        ResultStore::default(),
        config.aggregator_options(),
    ));

    if let Err(e) = aggregator.resume().await {
        warn!(error = %e, "Ignoring unreadable previous artifact");
    }

    if cli.once {
        let published = aggregator.run_cycle().await.is_some_and(|r| r.published);
        anyhow::ensure!(published, "Cycle finished without publishing the artifact");
        return Ok(());
    }

    let scheduler = Scheduler::spawn(Arc::clone(&aggregator), config.aggregator.interval());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown requested, waiting for any running cycle");
    scheduler.stop().await;

    Ok(())
}
