use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, RecordBatch, StringBuilder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::data_model::CleanedRecord;
use crate::error::Result;
use crate::pipeline::writers::BaseWriter;

fn create_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::UInt64, false),
        Field::new("text", DataType::Utf8, false),
        Field::new("sentiment", DataType::Utf8, false),
        Field::new("date", DataType::Utf8, true),
        Field::new("text_clean", DataType::Utf8, false),
        Field::new("text_len", DataType::UInt64, false),
        Field::new("token_len", DataType::UInt64, true),
    ]))
}

/// Writes CleanedRecords to a Parquet file.
pub struct ParquetWriter {
    schema: SchemaRef,
    writer: Option<ArrowWriter<File>>,
}

impl ParquetWriter {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let schema = create_schema();
        let file = File::create(path)?;
        let props = WriterProperties::builder().build();
        let writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        Ok(ParquetWriter {
            schema,
            writer: Some(writer),
        })
    }
}

impl BaseWriter for ParquetWriter {
    fn write_batch(&mut self, records: &[CleanedRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut id_builder = UInt64Builder::new();
        let mut text_builder = StringBuilder::new();
        let mut sentiment_builder = StringBuilder::new();
        let mut date_builder = StringBuilder::new();
        let mut clean_builder = StringBuilder::new();
        let mut text_len_builder = UInt64Builder::new();
        let mut token_len_builder = UInt64Builder::new();

        for record in records {
            id_builder.append_value(record.id as u64);
            text_builder.append_value(&record.text);
            sentiment_builder.append_value(&record.sentiment);
            date_builder.append_option(record.date.as_deref());
            clean_builder.append_value(&record.text_clean);
            text_len_builder.append_value(record.text_len as u64);
            token_len_builder.append_option(record.token_len.map(|t| t as u64));
        }

        let batch = RecordBatch::try_new(
            self.schema.clone(),
            vec![
                Arc::new(id_builder.finish()) as ArrayRef,
                Arc::new(text_builder.finish()) as ArrayRef,
                Arc::new(sentiment_builder.finish()) as ArrayRef,
                Arc::new(date_builder.finish()) as ArrayRef,
                Arc::new(clean_builder.finish()) as ArrayRef,
                Arc::new(text_len_builder.finish()) as ArrayRef,
                Arc::new(token_len_builder.finish()) as ArrayRef,
            ],
        )?;

        if let Some(writer) = self.writer.as_mut() {
            writer.write(&batch)?;
        }

        Ok(())
    }

    fn close(mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.close()?;
        }
        Ok(())
    }
}

/// Writes one partition to `path` in a single batch.
pub fn write_partition<P: AsRef<Path>>(path: P, records: &[CleanedRecord]) -> Result<()> {
    let mut writer = ParquetWriter::new(path)?;
    writer.write_batch(records)?;
    writer.close()
}
