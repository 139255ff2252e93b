use crate::data_model::CleanedRecord;
use crate::error::Result;

/// Trait for writing batches of cleaned records to an output sink (e.g. file).
pub trait BaseWriter {
    /// Write a batch of records to the sink.
    fn write_batch(&mut self, records: &[CleanedRecord]) -> Result<()>;

    /// Finalize and close the output writer.
    fn close(self) -> Result<()>;
}
