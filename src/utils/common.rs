// src/utils/common.rs

use indicatif::{ProgressBar, ProgressStyle};
use prometheus::{gather, Encoder, TextEncoder};
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

pub const RECORD_PB_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] {msg} {pos}/{len} ({percent}%) ({per_sec}, ETA: {eta})";

/// Installs the global `fmt` subscriber. `RUST_LOG` wins over the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")); // Default to info if RUST_LOG is not set
    fmt::Subscriber::builder().with_env_filter(filter).init();
}

pub fn create_progress_bar(total_items: u64, message: &str, template: &str) -> ProgressBar {
    let pb = if total_items == 0 {
        // Spinner if total is unknown (or 0)
        ProgressBar::new_spinner()
    } else {
        ProgressBar::new(total_items)
    };
    pb.set_message(message.to_string());
    pb.set_style(
        ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar()) // Fallback style
            .progress_chars("=> "),
    );
    pb
}

/// A record-counting bar, or a hidden one when progress output is off.
pub fn record_progress_bar(show: bool, total_items: usize, message: &str) -> ProgressBar {
    if show {
        create_progress_bar(total_items as u64, message, RECORD_PB_TEMPLATE)
    } else {
        ProgressBar::hidden()
    }
}

/// Current registry contents in the Prometheus text exposition format.
pub fn encode_metrics() -> std::result::Result<String, String> {
    let encoder = TextEncoder::new();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&gather(), &mut buffer) {
        error!("Could not encode prometheus metrics: {}", e);
        return Err(format!("Could not encode prometheus metrics: {}", e));
    }
    String::from_utf8(buffer).map_err(|e| {
        error!("Prometheus metrics UTF-8 error: {}", e);
        format!("Prometheus metrics UTF-8 error: {}", e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_bar_when_progress_is_off() {
        let pb = record_progress_bar(false, 10, "Cleaning");
        assert!(pb.is_hidden());
        pb.inc(3);
        assert_eq!(pb.position(), 3);
    }

    #[test]
    fn test_spinner_for_unknown_total() {
        let pb = create_progress_bar(0, "Loading", RECORD_PB_TEMPLATE);
        assert_eq!(pb.length(), None);
        let pb = create_progress_bar(5, "Loading", RECORD_PB_TEMPLATE);
        assert_eq!(pb.length(), Some(5));
    }

    #[test]
    fn test_encode_metrics_lists_registered_counters() {
        crate::utils::prometheus_metrics::PIPELINE_RUNS_TOTAL.inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("sentiment_pipeline_runs_total"));
    }
}
