#![allow(non_snake_case)]

pub mod classifier;
pub mod config;
pub mod dashboard;
pub mod data_model;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod utils;

pub use error::{PipelineError, Result};
pub use runner::{run_pipeline, PipelineRun};
