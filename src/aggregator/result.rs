//! The canonical result and its shared, swap-on-publish store.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::forecast::Forecast;

/// What the canonical result holds for one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionEntry {
    Forecast(Forecast),
    /// The region never issues a numeric rating.
    NoRating,
}

impl RegionEntry {
    pub fn forecast(&self) -> Option<&Forecast> {
        match self {
            Self::Forecast(f) => Some(f),
            Self::NoRating => None,
        }
    }
}

/// Last validated entry per region, plus when the set was generated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalResult {
    generated_at: Option<DateTime<Utc>>,
    entries: BTreeMap<String, RegionEntry>,
}

impl CanonicalResult {
    pub fn new(generated_at: Option<DateTime<Utc>>, entries: BTreeMap<String, RegionEntry>) -> Self {
        Self {
            generated_at,
            entries,
        }
    }

    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        self.generated_at
    }

    pub fn get(&self, region_id: &str) -> Option<&RegionEntry> {
        self.entries.get(region_id)
    }

    /// Entries keyed by region id, in sorted order.
    pub fn entries(&self) -> &BTreeMap<String, RegionEntry> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of this result with `updates` installed over the existing
    /// entries. Regions without an update keep what they had.
    pub fn with_updates(
        &self,
        updates: impl IntoIterator<Item = (String, RegionEntry)>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(updates);
        Self {
            generated_at: Some(generated_at),
            entries,
        }
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&str, &RegionEntry) -> bool) {
        self.entries.retain(|id, entry| keep(id, entry));
    }
}

/// Shared handle to the current canonical result.
///
/// Readers take an `Arc` snapshot; the aggregator builds the next result
/// off to the side and swaps it in, so nobody observes a half-applied cycle.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    current: Arc<RwLock<Arc<CanonicalResult>>>,
}

impl ResultStore {
    pub async fn snapshot(&self) -> Arc<CanonicalResult> {
        Arc::clone(&*self.current.read().await)
    }

    /// Replace the current result, returning the published snapshot.
    pub async fn publish(&self, next: CanonicalResult) -> Arc<CanonicalResult> {
        let next = Arc::new(next);
        *self.current.write().await = Arc::clone(&next);
        next
    }
}
