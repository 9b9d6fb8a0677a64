//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Conversions (per strategy counts and durations)
//! - External tool invocations
//! - Batches and cleanup

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Conversion Metrics
// =============================================================================

/// Conversions total by strategy and result.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("formatshift_conversions_total", "Total file conversions"),
        &["strategy", "result"], // result: "success", "failure"
    )
    .unwrap()
});

/// Conversion duration in seconds by strategy.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "formatshift_conversion_duration_seconds",
            "Duration of a single file conversion",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 180.0, 600.0]),
        &["strategy"],
    )
    .unwrap()
});

// =============================================================================
// Tool Metrics
// =============================================================================

/// External tool invocations by tool and result.
pub static TOOL_INVOCATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "formatshift_tool_invocations_total",
            "Total external tool invocations",
        ),
        &["tool", "result"], // result: "success", "failure", "timeout"
    )
    .unwrap()
});

// =============================================================================
// Batch Metrics
// =============================================================================

/// Files per accepted batch.
pub static BATCH_FILES: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("formatshift_batch_files", "Number of files per batch")
            .buckets(vec![1.0, 2.0, 3.0, 4.0]),
    )
    .unwrap()
});

/// Batches by result.
pub static BATCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("formatshift_batches_total", "Total conversion batches"),
        &["result"], // "single", "archive", "failed"
    )
    .unwrap()
});

/// Files that could not be deleted during cleanup.
pub static CLEANUP_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "formatshift_cleanup_failures_total",
        "Total files that failed to be removed during cleanup",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(TOOL_INVOCATIONS.clone()),
        Box::new(BATCH_FILES.clone()),
        Box::new(BATCHES_TOTAL.clone()),
        Box::new(CLEANUP_FAILURES.clone()),
    ]
}
