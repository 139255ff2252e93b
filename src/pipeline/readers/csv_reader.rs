// src/pipeline/readers/csv_reader.rs

use csv::{ByteRecord, ReaderBuilder};
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::config::InputConfig;
use crate::data_model::{Dataset, Record, DATE_COLUMN, SENTIMENT_COLUMN, TEXT_COLUMN};
use crate::error::{PipelineError, Result};
use crate::pipeline::readers::BaseReader;
use crate::utils::prometheus_metrics::RECORDS_LOADED_TOTAL;

/// ISO-8859-1: every byte is the code point of the same value, so decoding never fails.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Reads labelled posts from a delimited file.
#[derive(Debug, Clone)]
pub struct CsvReader {
    config: InputConfig,
}

impl CsvReader {
    pub fn new(config: InputConfig) -> Self {
        CsvReader { config }
    }

    fn load_error(&self, reason: impl ToString) -> PipelineError {
        PipelineError::DataLoadError {
            path: self.config.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl BaseReader for CsvReader {
    #[instrument(skip(self), fields(path = %self.config.path.display()))]
    fn read_dataset(&self) -> Result<Dataset> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.config.delimiter as u8)
            .has_headers(true)
            .from_path(&self.config.path)
            .map_err(|e| self.load_error(e))?;

        let headers: Vec<String> = reader
            .byte_headers()
            .map_err(|e| self.load_error(e))?
            .iter()
            .map(decode_latin1)
            .collect();
        let position = |name: &str| headers.iter().position(|h| h == name);

        let text_idx = position(&self.config.text_column).ok_or_else(|| {
            PipelineError::SchemaError(format!(
                "Text column '{}' not found in '{}' (columns: {:?})",
                self.config.text_column,
                self.config.path.display(),
                headers
            ))
        })?;
        let sentiment_idx = position(&self.config.sentiment_column);
        let date_idx = position(&self.config.date_column);

        let mut columns = vec![TEXT_COLUMN.to_string()];
        if sentiment_idx.is_some() {
            columns.push(SENTIMENT_COLUMN.to_string());
        }
        if date_idx.is_some() {
            columns.push(DATE_COLUMN.to_string());
        }

        let field = |row: &ByteRecord, idx: usize| row.get(idx).map(decode_latin1);
        let mut records = Vec::new();
        let mut row = ByteRecord::new();
        while reader.read_byte_record(&mut row).map_err(|e| self.load_error(e))? {
            let id = records.len();
            records.push(Record {
                id,
                text: field(&row, text_idx).unwrap_or_default(),
                sentiment: sentiment_idx
                    .and_then(|idx| field(&row, idx))
                    .unwrap_or_default(),
                date: date_idx
                    .and_then(|idx| field(&row, idx))
                    .filter(|d| !d.is_empty()),
            });
        }

        debug!(?headers, "Header row");
        info!("Loaded {} records with columns {:?}", records.len(), columns);
        RECORDS_LOADED_TOTAL.inc_by(records.len() as f64);
        Ok(Dataset::new(columns, records))
    }
}

/// Reads a comma-separated file with the default `Text`/`Sentiment`/`Date` headers.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let config = InputConfig {
        path: path.as_ref().to_path_buf(),
        ..InputConfig::default()
    };
    CsvReader::new(config).read_dataset()
}
