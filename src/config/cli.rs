// Command-line arguments shared by the binaries.

use crate::config::pipeline::{load_pipeline_config, PipelineConfig, TokenizerConfig};
use crate::error::Result;
use clap::{Args, Parser};
use std::path::PathBuf;
use tracing::info;

/// Options every binary accepts.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Path to the pipeline configuration YAML file. Built-in defaults are used when omitted.
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Overrides the input CSV path from the configuration.
    #[arg(short, long)]
    pub input_file: Option<PathBuf>,

    /// Overrides the pretrained tokenizer name (e.g. bert-base-uncased).
    #[arg(long)]
    pub tokenizer: Option<String>,

    /// Count tokens with the whitespace counter instead of downloading a tokenizer.
    #[arg(long)]
    pub offline: bool,

    /// Disable progress bars.
    #[arg(long)]
    pub no_progress: bool,

    /// Validate the pipeline configuration and exit
    #[arg(long)]
    pub validate_config: bool,
}

impl CommonArgs {
    /// Loads the configuration (file or defaults), then applies command-line overrides.
    pub fn resolve_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading pipeline configuration from {}", path.display());
                load_pipeline_config(path)?
            }
            None => PipelineConfig::default(),
        };

        if let Some(input_file) = &self.input_file {
            config.input.path = input_file.clone();
        }
        let truncation = config.tokenizer.truncation();
        if let Some(name) = &self.tokenizer {
            config.tokenizer = TokenizerConfig::Pretrained {
                name: name.clone(),
                truncation,
            };
        }
        if self.offline {
            config.tokenizer = TokenizerConfig::Whitespace { truncation };
        }
        if self.no_progress {
            config.show_progress = false;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Runs the full pipeline and logs the evaluation summary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Directory to write the prepared train/test partitions to, as Parquet.
    #[arg(short = 'e', long)]
    pub export_dir: Option<PathBuf>,
}

/// Runs the full pipeline and writes the plain-text report.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ReportArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Overrides the report location from the configuration.
    #[arg(short = 'o', long)]
    pub output_file: Option<PathBuf>,
}

/// Serves the read-only dashboard.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Address to bind the dashboard server to.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port for the dashboard server.
    #[arg(short, long, default_value_t = 8501)]
    pub port: u16,
}
