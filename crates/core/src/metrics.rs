//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Event ingestion and count corrections
//! - Persistence attempts and failures
//! - Planning refreshes

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Aggregation
// =============================================================================

/// Viewing events by outcome.
pub static EVENTS_INGESTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("animelog_events_ingested_total", "Viewing events received"),
        &["result"], // "recorded", "duplicate", "rejected", "storage_error"
    )
    .unwrap()
});

/// Manual count corrections by outcome.
pub static COUNT_CORRECTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "animelog_count_corrections_total",
            "Manual watch count corrections",
        ),
        &["result"], // "applied", "not_found", "storage_error"
    )
    .unwrap()
});

/// Current number of history entries.
pub static HISTORY_ENTRIES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("animelog_history_entries", "Entries in the history log").unwrap()
});

// =============================================================================
// Persistence
// =============================================================================

/// Store write attempts, including retries.
pub static PERSIST_ATTEMPTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "animelog_persist_attempts_total",
        "Store write attempts including retries",
    )
    .unwrap()
});

/// Writes that failed after every retry.
pub static PERSIST_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "animelog_persist_failures_total",
        "Store writes that exhausted their retries",
    )
    .unwrap()
});

// =============================================================================
// Planning
// =============================================================================

/// Planning refreshes by outcome.
pub static PLANNING_REFRESHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("animelog_planning_refreshes_total", "Planning refreshes"),
        &["result"], // "success", "fetch_error", "storage_error"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(EVENTS_INGESTED.clone()),
        Box::new(COUNT_CORRECTIONS.clone()),
        Box::new(HISTORY_ENTRIES.clone()),
        Box::new(PERSIST_ATTEMPTS.clone()),
        Box::new(PERSIST_FAILURES.clone()),
        Box::new(PLANNING_REFRESHES.clone()),
    ]
}
