//! One fetch → parse → validate → publish pass over the catalog.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::aggregator::output;
use crate::aggregator::result::{CanonicalResult, RegionEntry, ResultStore};
use crate::data::{FeedSource, FetchError};
use crate::forecast::validate::{
    covers_day, is_no_rating_region, validate, validate_logged, ValidationError,
};
use crate::monitoring::metrics::{log_report, CycleReport};
use crate::parsers::{self, ParseError};
use crate::region::{Region, RegionCatalog};

/// Why a region kept its previous entry this cycle.
#[derive(Debug, Error)]
pub enum RegionFailure {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("region task failed: {0}")]
    Task(String),
}

/// Parse and validate one raw feed.
///
/// For a region that never issues ratings, an unparseable feed becomes the
/// no-rating marker and is validated like any other result.
pub fn ingest(raw: &str, region: &Region, strict: bool) -> Result<RegionEntry, RegionFailure> {
    let region_id = region.region_id();
    let parsed = match parsers::parse(raw, region) {
        Ok(forecast) => Some(forecast),
        Err(e) if is_no_rating_region(region_id) => {
            debug!(region = region_id, error = %e, "No rating published");
            None
        }
        Err(e) => return Err(e.into()),
    };

    validate_logged(region_id, parsed.as_deref(), strict)?;

    Ok(match parsed {
        Some(forecast) if !forecast.is_empty() => RegionEntry::Forecast(forecast),
        _ => RegionEntry::NoRating,
    })
}

async fn process_region(
    source: &dyn FeedSource,
    region: &Region,
    fetch_timeout: Duration,
    strict: bool,
) -> Result<RegionEntry, RegionFailure> {
    let raw = tokio::time::timeout(fetch_timeout, source.fetch(region))
        .await
        .map_err(|_| FetchError::Timeout(fetch_timeout))??;
    ingest(&raw, region, strict)
}

#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    pub max_concurrent_fetches: usize,
    pub fetch_timeout: Duration,
    pub strict_validation: bool,
    /// Where to publish the artifact. `None` keeps the result in memory only.
    pub output_path: Option<PathBuf>,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 8,
            fetch_timeout: Duration::from_secs(30),
            strict_validation: false,
            output_path: None,
        }
    }
}

/// Clears the in-flight flag when a cycle ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Aggregator {
    catalog: Arc<RegionCatalog>,
    source: Arc<dyn FeedSource>,
    store: ResultStore,
    options: AggregatorOptions,
    in_flight: AtomicBool,
    cycle_number: AtomicU64,
}

impl Aggregator {
    pub fn new(
        catalog: Arc<RegionCatalog>,
        source: Arc<dyn FeedSource>,
        store: ResultStore,
        options: AggregatorOptions,
    ) -> Self {
        Self {
            catalog,
            source,
            store,
            options,
            in_flight: AtomicBool::new(false),
            cycle_number: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Number of cycles started so far.
    pub fn cycles_started(&self) -> u64 {
        self.cycle_number.load(Ordering::Relaxed)
    }

    /// Seed the store from the last published artifact.
    ///
    /// Entries for regions no longer in the catalog, and entries that no
    /// longer validate, are dropped. A missing artifact is not an error.
    pub async fn resume(&self) -> Result<usize, output::OutputError> {
        let Some(path) = self.options.output_path.as_deref() else {
            return Ok(0);
        };
        let Some(mut previous) = output::read_artifact(path).await? else {
            info!(path = %path.display(), "No previous artifact, starting empty");
            return Ok(0);
        };

        previous.retain(|region_id, entry| {
            self.catalog.lookup(region_id).is_some()
                && validate(region_id, entry.forecast().map(Vec::as_slice)).is_ok()
        });
        let restored = previous.len();
        self.store.publish(previous).await;
        info!(path = %path.display(), restored, "Resumed from previous artifact");
        Ok(restored)
    }

    /// Run one cycle unless another is still in flight, in which case the
    /// trigger is dropped and `None` returned.
    pub async fn run_cycle(&self) -> Option<CycleReport> {
        let Some(_guard) = InFlight::claim(&self.in_flight) else {
            info!("Previous cycle still in flight, skipping trigger");
            return None;
        };
        let report = self.execute_cycle(Local::now().date_naive()).await;
        log_report(&report);
        Some(report)
    }

    async fn execute_cycle(&self, today: NaiveDate) -> CycleReport {
        let started = Instant::now();
        let cycle = self.cycle_number.fetch_add(1, Ordering::Relaxed);
        let regions = self.catalog.regions().to_vec();
        let mut report = CycleReport::new(cycle, regions.len());
        info!(cycle, regions = regions.len(), source = self.source.name(), "Starting cycle");

        let strict = self.options.strict_validation;
        let fetch_timeout = self.options.fetch_timeout;
        let outcomes: Vec<(String, Result<RegionEntry, RegionFailure>)> =
            stream::iter(regions.into_iter().map(|region| {
                let source = Arc::clone(&self.source);
                async move {
                    let region_id = region.region_id().to_string();
                    let task = tokio::spawn(async move {
                        process_region(source.as_ref(), &region, fetch_timeout, strict).await
                    });
                    let outcome = task
                        .await
                        .unwrap_or_else(|e| Err(RegionFailure::Task(e.to_string())));
                    (region_id, outcome)
                }
            }))
            .buffer_unordered(self.options.max_concurrent_fetches.max(1))
            .collect()
            .await;

        let mut updates = Vec::new();
        for (region_id, outcome) in outcomes {
            match outcome {
                Ok(entry) => {
                    let stale = entry.forecast().is_some_and(|f| !covers_day(f, today));
                    if stale {
                        info!(region = %region_id, "Forecast does not cover today yet");
                    }
                    report.record_success(&entry, stale);
                    updates.push((region_id, entry));
                }
                Err(failure) => {
                    // validation rejections are logged by the validator
                    if !matches!(failure, RegionFailure::Validation(_)) {
                        warn!(region = %region_id, error = %failure, "Region kept previous entry");
                    }
                    report.record_failure(&failure);
                }
            }
        }

        let current = self.store.snapshot().await;
        let published = self.store.publish(current.with_updates(updates, Utc::now())).await;
        report.published = self.write_output(&published).await;
        report.duration_ms = started.elapsed().as_millis() as u64;
        report
    }

    async fn write_output(&self, result: &CanonicalResult) -> bool {
        let Some(path) = self.options.output_path.as_deref() else {
            return true;
        };
        match output::write_artifact(path, result).await {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to write artifact");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::ForecastDay;

    fn region(id: &str) -> Region {
        Region::new(id, "Test", "http://example.invalid/feed").unwrap()
    }

    const UAC: &str = r#"{"advisories":[{"advisory":{"date_issued":"Sunday, February 3, 2013 - 6:52am","overall_danger_rating":"moderate"}}]}"#;

    #[test]
    fn test_ingest_valid_feed() {
        let entry = ingest(UAC, &region("uac_ogden"), true).unwrap();
        assert_eq!(
            entry,
            RegionEntry::Forecast(vec![ForecastDay::new(
                NaiveDate::from_ymd_opt(2013, 2, 3).unwrap(),
                2
            )])
        );
    }

    #[test]
    fn test_ingest_parse_failure() {
        assert!(matches!(
            ingest("<html>busy</html>", &region("uac_ogden"), false),
            Err(RegionFailure::Parse(_))
        ));
    }

    #[test]
    fn test_ingest_validation_failure() {
        let raw = r#"{"days":[
            {"date":"2013-12-05","danger":{"above_treeline":"Low"}},
            {"date":"2013-12-07","danger":{"above_treeline":"Low"}}
        ]}"#;
        assert!(matches!(
            ingest(raw, &region("nwac_olympics"), false),
            Err(RegionFailure::Validation(ValidationError::NotConsecutive { index: 1 }))
        ));
    }

    #[test]
    fn test_ingest_no_rating_region() {
        let entry = ingest("<html>no bulletin</html>", &region("cacb_northrockies"), true).unwrap();
        assert_eq!(entry, RegionEntry::NoRating);
    }

    #[test]
    fn test_in_flight_guard_releases_on_drop() {
        let flag = AtomicBool::new(false);
        let guard = InFlight::claim(&flag).unwrap();
        assert!(InFlight::claim(&flag).is_none());
        drop(guard);
        assert!(InFlight::claim(&flag).is_some());
    }
}
