// src/pipeline/readers/parquet_reader.rs

use arrow::array::{Array, StringArray, UInt64Array};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::data_model::CleanedRecord;
use crate::error::{PipelineError, Result};

/// Reads `CleanedRecord`s back from a Parquet file written by `ParquetWriter`.
#[derive(Debug)]
pub struct ParquetReader {
    path: PathBuf,
    batch_size: Option<usize>,
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| {
            PipelineError::SchemaError(format!("Column '{}' is missing or not Utf8", name))
        })
}

fn u64_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a UInt64Array> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<UInt64Array>())
        .ok_or_else(|| {
            PipelineError::SchemaError(format!("Column '{}' is missing or not UInt64", name))
        })
}

impl ParquetReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ParquetReader {
            path: path.as_ref().to_path_buf(),
            batch_size: None,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn read_records(&self) -> Result<Vec<CleanedRecord>> {
        let file = File::open(&self.path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let builder = if let Some(batch_size) = self.batch_size {
            builder.with_batch_size(batch_size)
        } else {
            builder
        };
        let reader = builder.build()?;

        let mut records = Vec::new();
        for batch in reader {
            let batch = batch?;
            let ids = u64_column(&batch, "id")?;
            let texts = string_column(&batch, "text")?;
            let sentiments = string_column(&batch, "sentiment")?;
            let dates = string_column(&batch, "date")?;
            let cleaned = string_column(&batch, "text_clean")?;
            let text_lens = u64_column(&batch, "text_len")?;
            let token_lens = u64_column(&batch, "token_len")?;

            for i in 0..batch.num_rows() {
                records.push(CleanedRecord {
                    id: ids.value(i) as usize,
                    text: texts.value(i).to_string(),
                    sentiment: sentiments.value(i).to_string(),
                    date: (!dates.is_null(i)).then(|| dates.value(i).to_string()),
                    text_clean: cleaned.value(i).to_string(),
                    text_len: text_lens.value(i) as usize,
                    token_len: (!token_lens.is_null(i)).then(|| token_lens.value(i) as usize),
                });
            }
        }
        Ok(records)
    }
}
