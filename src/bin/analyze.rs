// src/bin/analyze.rs

//! # Analyze Binary
//!
//! Runs the full sentiment pipeline once: load the CSV, split, clean, filter,
//! balance, train the TF-IDF + Naive Bayes classifier and evaluate it on the
//! held-out test partition. The evaluation summary is logged through `tracing`.
//!
//! With `--export-dir`, the cleaned train and test partitions are also written
//! to `train.parquet` and `test.parquet` in that directory.

use clap::Parser;
use indicatif::HumanDuration;
use std::fs;
use std::time::Instant;
use tracing::info;
use SentimentSieve::config::cli::AnalyzeArgs;
use SentimentSieve::data_model::Sentiment;
use SentimentSieve::error::Result;
use SentimentSieve::pipeline::token::build_token_counter;
use SentimentSieve::pipeline::writers::write_partition;
use SentimentSieve::runner::run_pipeline;
use SentimentSieve::utils::common::init_logging;

fn main() -> Result<()> {
    init_logging();
    let args = AnalyzeArgs::parse();

    let config = args.common.resolve_config()?;
    if args.common.validate_config {
        info!("Pipeline configuration is valid.");
        return Ok(());
    }

    let start = Instant::now();
    let counter = build_token_counter(&config.tokenizer)?;
    let run = run_pipeline(&config, counter)?;

    info!(
        "Data: {} records, train {} -> {} after preprocessing ({} after oversampling), test {} -> {}",
        run.total_records,
        run.initial.train,
        run.after_token_filter.train,
        run.train_size_after_oversampling(),
        run.initial.test,
        run.after_token_filter.test
    );
    info!(
        "Validation: {} records, test: {} records",
        run.prepared.x_valid.len(),
        run.prepared.x_test.len()
    );
    let metrics = &run.metrics;
    for class in Sentiment::ALL {
        let m = metrics.class(class);
        info!(
            "{:<8} precision {:.2}% recall {:.2}% f1 {:.2}% support {}",
            class.label(),
            m.precision * 100.0,
            m.recall * 100.0,
            m.f1 * 100.0,
            m.support
        );
    }
    let (best, best_f1) = metrics.best_class();
    let (worst, worst_f1) = metrics.worst_class();
    info!("Accuracy: {:.2}%", metrics.accuracy * 100.0);
    info!("Best class: {} (F1 {:.2}%)", best, best_f1 * 100.0);
    info!("Worst class: {} (F1 {:.2}%)", worst, worst_f1 * 100.0);

    if let Some(dir) = &args.export_dir {
        fs::create_dir_all(dir)?;
        write_partition(dir.join("train.parquet"), &run.train_records)?;
        write_partition(dir.join("test.parquet"), &run.test_records)?;
        info!("Exported prepared partitions to {}", dir.display());
    }

    info!("Analysis finished in {}", HumanDuration(start.elapsed()));
    Ok(())
}
