//! Per-cycle aggregation metrics.
//!
//! Counts what happened to every region in one cycle and renders the
//! operator-facing summary line.

use tracing::info;

use crate::aggregator::cycle::RegionFailure;
use crate::aggregator::result::RegionEntry;

/// Outcome counts for one aggregation cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub regions: usize,
    /// Regions whose entry was replaced by this cycle's forecast.
    pub updated: usize,
    pub no_rating: usize,
    /// Installed forecasts that do not cover the current day.
    pub stale: usize,
    pub fetch_failures: usize,
    pub parse_failures: usize,
    pub validation_failures: usize,
    pub task_failures: usize,
    /// Whether the result reached the output artifact.
    pub published: bool,
    pub duration_ms: u64,
}

impl CycleReport {
    pub fn new(cycle: u64, regions: usize) -> Self {
        Self {
            cycle,
            regions,
            ..Default::default()
        }
    }

    pub fn record_success(&mut self, entry: &RegionEntry, stale: bool) {
        match entry {
            RegionEntry::Forecast(_) => self.updated += 1,
            RegionEntry::NoRating => self.no_rating += 1,
        }
        if stale {
            self.stale += 1;
        }
    }

    pub fn record_failure(&mut self, failure: &RegionFailure) {
        match failure {
            RegionFailure::Fetch(_) => self.fetch_failures += 1,
            RegionFailure::Parse(_) => self.parse_failures += 1,
            RegionFailure::Validation(_) => self.validation_failures += 1,
            RegionFailure::Task(_) => self.task_failures += 1,
        }
    }

    pub fn failures(&self) -> usize {
        self.fetch_failures + self.parse_failures + self.validation_failures + self.task_failures
    }

    /// Format for logging.
    pub fn summary(&self) -> String {
        format!(
            "Cycle {}: {}/{} regions updated ({} no-rating, {} stale) | \
             failures: {} fetch, {} parse, {} validation, {} task | {} in {}ms",
            self.cycle,
            self.updated + self.no_rating,
            self.regions,
            self.no_rating,
            self.stale,
            self.fetch_failures,
            self.parse_failures,
            self.validation_failures,
            self.task_failures,
            if self.published { "published" } else { "NOT published" },
            self.duration_ms,
        )
    }
}

pub fn log_report(report: &CycleReport) {
    info!(
        cycle = report.cycle,
        regions = report.regions,
        updated = report.updated,
        no_rating = report.no_rating,
        stale = report.stale,
        failures = report.failures(),
        published = report.published,
        duration_ms = report.duration_ms,
        "{}",
        report.summary()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FetchError;
    use crate::forecast::validate::ValidationError;
    use std::time::Duration;

    #[test]
    fn test_counts_by_outcome() {
        let mut report = CycleReport::new(4, 5);
        report.record_success(&RegionEntry::Forecast(vec![]), true);
        report.record_success(&RegionEntry::NoRating, false);
        report.record_failure(&RegionFailure::Fetch(FetchError::Timeout(Duration::from_secs(5))));
        report.record_failure(&RegionFailure::Validation(ValidationError::MixedRating));
        report.record_failure(&RegionFailure::Task("panicked".to_string()));

        assert_eq!(report.updated, 1);
        assert_eq!(report.no_rating, 1);
        assert_eq!(report.stale, 1);
        assert_eq!(report.failures(), 3);
        assert_eq!(report.validation_failures, 1);
    }

    #[test]
    fn test_summary_line() {
        let report = CycleReport {
            cycle: 2,
            regions: 3,
            updated: 2,
            parse_failures: 1,
            published: true,
            duration_ms: 120,
            ..Default::default()
        };
        assert_eq!(
            report.summary(),
            "Cycle 2: 2/3 regions updated (0 no-rating, 0 stale) | \
             failures: 0 fetch, 1 parse, 0 validation, 0 task | published in 120ms"
        );
    }
}
