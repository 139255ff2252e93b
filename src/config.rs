// src/config.rs

pub mod cli;
pub mod pipeline;

pub use pipeline::{
    load_pipeline_config, InputConfig, PipelineConfig, TokenizerConfig, UnknownLabelPolicy,
};
