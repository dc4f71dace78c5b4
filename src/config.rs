use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::aggregator::AggregatorOptions;

/// Environment override for the regeneration cadence, in seconds.
pub const INTERVAL_ENV: &str = "FORECAST_GEN_INTERVAL_SECONDS";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub aggregator: AggregatorConfig,
    pub fetch: FetchConfig,
    pub catalog: CatalogConfig,
    pub output: OutputConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
    pub interval_seconds: u64,
    pub max_concurrent_fetches: usize,
    #[serde(default)]
    pub strict_validation: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub regions_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: String,
}

impl AggregatorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, after `.env`, then apply the
    /// interval override from the environment.
    pub fn load(path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::from_file(path)?;
        if let Ok(raw) = std::env::var(INTERVAL_ENV) {
            config.apply_interval_override(&raw)?;
        }
        config.check()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn apply_interval_override(&mut self, raw: &str) -> Result<()> {
        self.aggregator.interval_seconds = raw
            .trim()
            .parse()
            .with_context(|| {
                format!("{INTERVAL_ENV} must be a whole number of seconds, got {raw:?}")
            })?;
        Ok(())
    }

    fn check(&self) -> Result<()> {
        anyhow::ensure!(
            self.aggregator.interval_seconds > 0,
            "aggregator.interval_seconds must be positive"
        );
        anyhow::ensure!(
            self.aggregator.max_concurrent_fetches > 0,
            "aggregator.max_concurrent_fetches must be positive"
        );
        anyhow::ensure!(
            self.fetch.timeout_seconds > 0,
            "fetch.timeout_seconds must be positive"
        );
        Ok(())
    }

    pub fn aggregator_options(&self) -> AggregatorOptions {
        AggregatorOptions {
            max_concurrent_fetches: self.aggregator.max_concurrent_fetches,
            fetch_timeout: self.fetch.timeout(),
            strict_validation: self.aggregator.strict_validation,
            output_path: Some(self.output.path.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_config() -> AppConfig {
        AppConfig::from_file(Path::new("config/default.toml"))
            .expect("config/default.toml should parse")
    }

    #[test]
    fn test_parse_default_config() {
        let config = default_config();
        assert_eq!(config.aggregator.interval_seconds, 1800);
        assert_eq!(config.aggregator.max_concurrent_fetches, 8);
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));
        assert_eq!(config.catalog.regions_path, PathBuf::from("public/v1/regions.json"));
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_interval_override() {
        let mut config = default_config();
        config.apply_interval_override(" 300 ").unwrap();
        assert_eq!(config.aggregator.interval(), Duration::from_secs(300));
        assert!(config.apply_interval_override("soon").is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = default_config();
        config.aggregator.interval_seconds = 0;
        assert!(config.check().is_err());
    }

    #[test]
    fn test_aggregator_options_carry_output_path() {
        let options = default_config().aggregator_options();
        assert_eq!(options.output_path, Some(PathBuf::from("public/v1/forecasts.json")));
        assert_eq!(options.fetch_timeout, Duration::from_secs(30));
    }
}
