//! Prometheus metrics for core components.
//!
//! Covers the classification pipeline: tickets created, classification
//! outcomes, call durations, and queue drops.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

/// Tickets created total.
pub static TICKETS_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "triage_tickets_created_total",
        "Total tickets created since startup",
    )
    .unwrap()
});

/// Classifications total by outcome.
pub static CLASSIFICATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "triage_classifications_total",
            "Total classification attempts",
        ),
        &["outcome"], // "classified", "failed", "missing"
    )
    .unwrap()
});

/// Classification duration in seconds, end to end per task.
pub static CLASSIFICATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "triage_classification_duration_seconds",
            "Duration of classification tasks",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["outcome"],
    )
    .unwrap()
});

/// Tasks dropped because the queue was full or closed.
pub static TASKS_DROPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "triage_tasks_dropped_total",
            "Classification tasks dropped at submission",
        ),
        &["reason"], // "queue_full", "queue_closed"
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(TICKETS_CREATED.clone()),
        Box::new(CLASSIFICATIONS_TOTAL.clone()),
        Box::new(CLASSIFICATION_DURATION.clone()),
        Box::new(TASKS_DROPPED.clone()),
    ]
}
