// src/bin/dashboard.rs

//! # Dashboard Binary
//!
//! Serves the read-only analysis dashboard over HTTP. The pipeline runs lazily
//! on the first page request and its result is cached for later requests.
//!
//! Routes: `GET /health`, `GET /pages/:page?format=text|json`, `GET /metrics`.

use clap::Parser;
use tracing::info;
use SentimentSieve::config::cli::DashboardArgs;
use SentimentSieve::dashboard::{serve, AppState, DashboardCache, PageKind};
use SentimentSieve::error::Result;
use SentimentSieve::pipeline::token::build_token_counter;
use SentimentSieve::utils::common::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = DashboardArgs::parse();

    let config = args.common.resolve_config()?;
    if args.common.validate_config {
        info!("Pipeline configuration is valid.");
        return Ok(());
    }

    let counter = build_token_counter(&config.tokenizer)?;
    let pages: Vec<&str> = PageKind::ALL.iter().map(|p| p.slug()).collect();
    info!("Dashboard pages: {}", pages.join(", "));

    let state = AppState::new(config, DashboardCache::new(counter));
    serve(&args.host, args.port, state).await
}
