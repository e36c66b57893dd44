//! Prometheus metrics for the Libris server.
//!
//! This module provides:
//! - HTTP request metrics (count, latency)
//! - Result cache metrics (hits, misses, evictions, clears, entries)
//! - Report job metrics (submitted, finished by outcome)

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

    // Cache metrics
    pub const CACHE_HITS_TOTAL: &str = "cache_hits_total";
    pub const CACHE_MISSES_TOTAL: &str = "cache_misses_total";
    pub const CACHE_EVICTIONS_TOTAL: &str = "cache_evictions_total";
    pub const CACHE_CLEARS_TOTAL: &str = "cache_clears_total";
    pub const CACHE_ENTRIES: &str = "cache_entries";

    // Report job metrics
    pub const REPORT_JOBS_SUBMITTED_TOTAL: &str = "report_jobs_submitted_total";
    pub const REPORT_JOBS_FINISHED_TOTAL: &str = "report_jobs_finished_total";
}

/// Initialize the Prometheus metrics exporter.
///
/// This should be called once at server startup.
/// Returns `true` if initialization succeeded, `false` if already initialized.
pub fn init_metrics() -> bool {
    if PROMETHEUS_HANDLE.get().is_some() {
        tracing::debug!("Prometheus metrics already initialized");
        return false;
    }

    // Pull-based: /metrics renders from the handle
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROMETHEUS_HANDLE.set(handle).is_err() {
                tracing::warn!("Failed to store Prometheus handle (already set)");
                return false;
            }

            tracing::info!("Prometheus metrics initialized");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Prometheus recorder");
            false
        }
    }
}

/// Render all metrics in Prometheus text format.
///
/// Returns `None` if metrics were not initialized.
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|handle| handle.render())
}

// =============================================================================
// HTTP Metrics
// =============================================================================

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let status_class = match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    };

    // Normalize path to avoid high cardinality
    let normalized_path = normalize_path(path);

    counter!(
        names::HTTP_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "path" => normalized_path.clone(),
        "status" => status.to_string(),
        "status_class" => status_class.to_string()
    )
    .increment(1);

    histogram!(
        names::HTTP_REQUEST_DURATION_SECONDS,
        "method" => method.to_string(),
        "path" => normalized_path
    )
    .record(duration.as_secs_f64());
}

// =============================================================================
// Cache Metrics
// =============================================================================

pub fn record_cache_hit(cache: &'static str) {
    counter!(names::CACHE_HITS_TOTAL, "cache" => cache).increment(1);
}

pub fn record_cache_miss(cache: &'static str) {
    counter!(names::CACHE_MISSES_TOTAL, "cache" => cache).increment(1);
}

pub fn record_cache_eviction(cache: &'static str) {
    counter!(names::CACHE_EVICTIONS_TOTAL, "cache" => cache).increment(1);
}

pub fn record_cache_clear(cache: &'static str) {
    counter!(names::CACHE_CLEARS_TOTAL, "cache" => cache).increment(1);
}

/// Set the number of resident entries of a cache.
pub fn set_cache_entries(cache: &'static str, count: usize) {
    gauge!(names::CACHE_ENTRIES, "cache" => cache).set(count as f64);
}

// =============================================================================
// Report Job Metrics
// =============================================================================

pub fn record_report_submitted() {
    counter!(names::REPORT_JOBS_SUBMITTED_TOTAL).increment(1);
}

/// Record a job reaching a terminal state (`completed` or `failed`).
pub fn record_report_finished(outcome: &'static str) {
    counter!(names::REPORT_JOBS_FINISHED_TOTAL, "outcome" => outcome).increment(1);
}

// =============================================================================
// Helpers
// =============================================================================

/// Normalize a path to reduce cardinality.
///
/// Replaces numeric entity ids and task UUIDs with placeholders.
fn normalize_path(path: &str) -> String {
    // /api/books/12 -> /api/books/{id}
    // /logs/reports/<uuid>/status -> /logs/reports/{task_id}/status
    path.split('/')
        .map(|part| {
            if is_uuid_like(part) {
                "{task_id}"
            } else if !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()) {
                "{id}"
            } else {
                part
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_uuid_like(s: &str) -> bool {
    s.len() == 36 && s.chars().filter(|c| *c == '-').count() == 4
}
