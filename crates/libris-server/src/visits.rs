//! Per-path request counters.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;

#[derive(Debug, Default)]
pub struct VisitTracker {
    by_url: DashMap<String, AtomicU64>,
    total: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalVisits {
    pub total_site_visits: u64,
}

impl VisitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one visit to `url` and returns the new total.
    pub fn track(&self, url: &str) -> u64 {
        let for_url = match self.by_url.get(url) {
            Some(counter) => counter.fetch_add(1, Ordering::Relaxed) + 1,
            None => self
                .by_url
                .entry(url.to_string())
                .or_default()
                .fetch_add(1, Ordering::Relaxed)
                + 1,
        };
        let total = self.total.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!(url, for_url, total, "visit tracked");
        total
    }

    pub fn visits_for(&self, url: &str) -> u64 {
        self.by_url
            .get(url)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn total(&self) -> TotalVisits {
        TotalVisits {
            total_site_visits: self.total.load(Ordering::Relaxed),
        }
    }

    /// Snapshot of every tracked path, sorted by path.
    pub fn by_url(&self) -> BTreeMap<String, u64> {
        self.by_url
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect()
    }
}
