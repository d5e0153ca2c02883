//! Asynchronous CSV reader with batch interface
//!
//! Provides a streaming interface over recorded operations from a CSV
//! file. Supports batch reading for efficient async processing.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - Batch reading for efficient processing
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of OperationRecords
//!                  ↓
//!           csv_format module
//!           (CsvOperation, convert_operation)
//! ```

use crate::core::catalog::StatusCatalog;
use crate::io::csv_format::{convert_operation, CsvOperation};
use crate::types::OperationRecord;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;

/// Asynchronous CSV reader
///
/// Provides batch reading interface over recorded operations.
/// Maintains streaming behavior with constant memory usage.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    catalog: StatusCatalog,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    ///
    /// # Arguments
    ///
    /// * `reader` - Async reader providing CSV data
    ///
    /// # Returns
    ///
    /// A new AsyncReader instance
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            catalog: StatusCatalog::new(),
        }
    }

    /// Read a batch of operation records
    ///
    /// This method reads up to `batch_size` rows from the CSV file,
    /// converting them to OperationRecords. Invalid rows are logged
    /// and skipped.
    ///
    /// # Arguments
    ///
    /// * `batch_size` - Maximum number of records to read
    ///
    /// # Returns
    ///
    /// A vector of successfully converted operation records.
    /// Returns an empty vector when the end of the file is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<OperationRecord> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut rows = self.csv_reader.deserialize::<CsvOperation>();

        while batch.len() < batch_size {
            match rows.next().await {
                Some(Ok(row)) => match convert_operation(row, &self.catalog) {
                    Ok(record) => batch.push(record),
                    Err(e) => tracing::warn!("Row conversion error: {e}"),
                },
                Some(Err(e)) => tracing::warn!("CSV parse error: {e}"),
                None => break,
            }
        }

        batch
    }
}
