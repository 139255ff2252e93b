use thiserror::Error;

/// Custom Result type for this crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The Error type for pipeline operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration validation error: {0}")]
    ConfigValidationError(String),

    #[error("Failed to load data from '{path}': {reason}")]
    DataLoadError { path: String, reason: String },

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Unknown sentiment label '{label}' in record {record_id}")]
    UnknownLabel { label: String, record_id: usize },

    #[error("Empty partition: {0}")]
    EmptyPartition(String),

    #[error("Record {record_id} filtered out: {reason}")]
    DocumentFiltered { record_id: usize, reason: String },

    #[error("Error in processing step '{step_name}': {source}")]
    StepError {
        step_name: String,
        source: Box<PipelineError>,
    },

    #[error("Tokenizer error: {0}")]
    TokenizerError(String),

    #[error("Classifier error: {0}")]
    ClassifierError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV error: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },

    #[error("Parquet error: {source}")]
    ParquetError {
        #[from]
        source: parquet::errors::ParquetError,
    },

    #[error("Arrow conversion error: {source}")]
    ArrowError {
        #[from]
        source: arrow::error::ArrowError,
    },

    #[error("Serialization/Deserialization error: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl PipelineError {
    /// True for per-record rejections, which the dataset-level stages swallow.
    pub fn is_filtered(&self) -> bool {
        match self {
            PipelineError::DocumentFiltered { .. } => true,
            PipelineError::StepError { source, .. } => source.is_filtered(),
            _ => false,
        }
    }
}
