// src/bin/report.rs

//! # Report Binary
//!
//! Runs the pipeline and writes the plain-text analysis report (dataset sizes,
//! class distributions, text length statistics, classification metrics and the
//! confusion matrix). The report is also echoed to stdout.

use clap::Parser;
use tracing::info;
use SentimentSieve::config::cli::ReportArgs;
use SentimentSieve::error::Result;
use SentimentSieve::pipeline::token::build_token_counter;
use SentimentSieve::report::write_report;
use SentimentSieve::runner::run_pipeline;
use SentimentSieve::utils::common::init_logging;

fn main() -> Result<()> {
    init_logging();
    let args = ReportArgs::parse();

    let mut config = args.common.resolve_config()?;
    if let Some(output_file) = &args.output_file {
        config.report_path = output_file.clone();
    }
    if args.common.validate_config {
        info!("Pipeline configuration is valid.");
        return Ok(());
    }

    let counter = build_token_counter(&config.tokenizer)?;
    let run = run_pipeline(&config, counter)?;
    let report = write_report(&run, &config.report_path)?;
    println!("{}", report);
    Ok(())
}
