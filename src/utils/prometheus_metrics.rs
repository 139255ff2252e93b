// src/utils/prometheus_metrics.rs

use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_histogram, Counter, CounterVec, Histogram,
};

pub static PIPELINE_RUNS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "sentiment_pipeline_runs_total",
        "Total number of completed pipeline runs."
    )
    .expect("Failed to register PIPELINE_RUNS_TOTAL counter")
});

pub static RECORDS_LOADED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "sentiment_records_loaded_total",
        "Total number of records read from the input file."
    )
    .expect("Failed to register RECORDS_LOADED_TOTAL counter")
});

pub static DUPLICATES_REMOVED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "sentiment_duplicates_removed_total",
        "Total number of duplicate train records removed."
    )
    .expect("Failed to register DUPLICATES_REMOVED_TOTAL counter")
});

pub static RECORDS_FILTERED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sentiment_records_filtered_total",
        "Total number of records dropped by a filter step.",
        &["step"]
    )
    .expect("Failed to register RECORDS_FILTERED_TOTAL counter")
});

pub static LABELS_DROPPED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "sentiment_labels_dropped_total",
        "Total number of records dropped for an unknown label."
    )
    .expect("Failed to register LABELS_DROPPED_TOTAL counter")
});

pub static RECORDS_OVERSAMPLED_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "sentiment_records_oversampled_total",
        "Total number of duplicate records added by oversampling."
    )
    .expect("Failed to register RECORDS_OVERSAMPLED_TOTAL counter")
});

pub static PIPELINE_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "sentiment_pipeline_duration_seconds",
        "Histogram of end-to-end pipeline run durations."
    )
    .expect("Failed to register PIPELINE_DURATION_SECONDS histogram")
});

/// Registers every metric up front so `/metrics` lists them before the first run.
pub fn register_metrics() {
    Lazy::force(&PIPELINE_RUNS_TOTAL);
    Lazy::force(&RECORDS_LOADED_TOTAL);
    Lazy::force(&DUPLICATES_REMOVED_TOTAL);
    Lazy::force(&RECORDS_FILTERED_TOTAL);
    Lazy::force(&LABELS_DROPPED_TOTAL);
    Lazy::force(&RECORDS_OVERSAMPLED_TOTAL);
    Lazy::force(&PIPELINE_DURATION_SECONDS);
}
