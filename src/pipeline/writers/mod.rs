// Declare the parquet_writer module
pub mod base_writer;
pub mod parquet_writer;

pub use base_writer::BaseWriter;
pub use parquet_writer::{write_partition, ParquetWriter};
