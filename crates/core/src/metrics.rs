//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Repository requests against TVmaze
//! - Catalog store loads and searches
//! - Lazy disclosure reveals and drag gestures

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Repository
// =============================================================================

/// Repository requests total by operation and result.
pub static REPOSITORY_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tvshelf_repository_requests_total",
            "Total requests issued to the show API",
        ),
        &["operation", "result"], // result: "success", "failure"
    )
    .unwrap()
});

/// Repository request duration in seconds.
pub static REPOSITORY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tvshelf_repository_duration_seconds",
            "Duration of requests to the show API",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation"],
    )
    .unwrap()
});

// =============================================================================
// Catalog store
// =============================================================================

/// Catalog loads total by result.
pub static CATALOG_LOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tvshelf_catalog_loads_total", "Total catalog load attempts"),
        &["result"], // "loaded", "failed", "skipped"
    )
    .unwrap()
});

/// Size of the canonical show collection.
pub static CATALOG_SIZE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "tvshelf_catalog_shows",
        "Number of shows in the canonical collection",
    )
    .unwrap()
});

/// Searches total by result.
pub static SEARCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tvshelf_searches_total", "Total show searches"),
        &["result"], // "success", "failed", "skipped", "cleared"
    )
    .unwrap()
});

// =============================================================================
// Presentation state
// =============================================================================

/// Lazy disclosure reveals completed.
pub static DISCLOSURE_REVEALS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "tvshelf_disclosure_reveals_total",
        "Total incremental reveals completed",
    )
    .unwrap()
});

/// Drag gestures total by outcome.
pub static DRAG_GESTURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tvshelf_drag_gestures_total", "Total completed drag gestures"),
        &["outcome"], // "previous", "next", "snapped_back"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Repository
        Box::new(REPOSITORY_REQUESTS.clone()),
        Box::new(REPOSITORY_DURATION.clone()),
        // Catalog
        Box::new(CATALOG_LOADS.clone()),
        Box::new(CATALOG_SIZE.clone()),
        Box::new(SEARCHES.clone()),
        // Presentation
        Box::new(DISCLOSURE_REVEALS.clone()),
        Box::new(DRAG_GESTURES.clone()),
    ]
}

/// Register all core metrics in `registry`.
pub fn register_all(registry: &prometheus::Registry) -> Result<(), prometheus::Error> {
    for metric in all_metrics() {
        registry.register(metric)?;
    }
    Ok(())
}
