//! Asynchronous batch processing strategy
//!
//! This module provides an asynchronous, multi-threaded implementation of
//! the ProcessingStrategy trait. It processes recorded operations in
//! batches using thread-based parallelism with request-based partitioning.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (request partitioning + tasks)
//!     └── AsyncWithdrawalEngine (thread-safe processing)
//!         └── SharedRequestStore (thread-safe request state)
//! ```
//!
//! # Ordering
//!
//! Batches are processed sequentially to maintain per-request ordering
//! across the entire file. Within each batch, operations are partitioned
//! by request id and different requests are processed in parallel.

use crate::core::r#async::{AsyncWithdrawalEngine, BatchProcessor, SharedRequestStore};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_requests_csv;
use crate::strategy::ProcessingStrategy;
use crate::types::RequestFilter;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Configuration for batch processing
///
/// Controls how operations are batched and the number of worker threads
/// for parallel processing within each batch.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of operations per batch
    pub batch_size: usize,
    /// Maximum number of batches processing concurrently
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a logged warning.
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                "Invalid batch_size ({batch_size}), using default ({})",
                default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            tracing::warn!(
                "Invalid max_concurrent_batches ({max_concurrent_batches}), using default ({})",
                default.max_concurrent_batches
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// Implements the ProcessingStrategy trait using multi-threaded batch
/// processing. Operations are read in batches and batches are processed
/// sequentially to maintain ordering; within each batch, operations are
/// partitioned by request id and processed in parallel.
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    /// Batch processing configuration
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy with the given configuration
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Process operations from input file and write the report to output
    ///
    /// This method implements the complete asynchronous batch pipeline:
    /// 1. Creates thread-safe engine components
    /// 2. Creates a BatchProcessor for request-based partitioning
    /// 3. Creates a tokio multi-threaded runtime
    /// 4. Reads operations in batches from CSV using AsyncReader
    /// 5. Processes each batch to completion before reading the next
    /// 6. Within each batch, processes different requests in parallel
    /// 7. Collects final request states
    /// 8. Writes the report using csv_format::write_requests_csv
    ///
    /// # Error Handling
    ///
    /// Fatal errors (file not found, I/O errors, runtime errors) are
    /// returned immediately. Individual operation errors are logged and
    /// processing continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        // Create tokio runtime for async execution
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        // Execute async processing within the runtime
        runtime.block_on(async {
            // Create thread-safe engine components
            let store = Arc::new(SharedRequestStore::new());
            let engine = Arc::new(AsyncWithdrawalEngine::new(Arc::clone(&store)));

            // Create batch processor
            let processor = BatchProcessor::new(Arc::clone(&engine));

            // Open the CSV file
            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);

            // Create async CSV reader
            let mut reader = AsyncReader::new(compat_file);

            // Process batches sequentially to maintain per-request
            // ordering across the entire file; each batch still runs
            // different requests in parallel
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;

                // An empty batch means end of file
                if batch.is_empty() {
                    break;
                }

                // A request's operations may span batches, so the next
                // batch starts only after this one completes
                let results = processor.process_batch(batch).await;
                for outcome in results.iter().filter(|r| r.result.is_err()) {
                    if let Err(e) = &outcome.result {
                        tracing::warn!("Operation error: {e}");
                    }
                }
            }

            // Collect final request states and write the report
            let requests = store.list(&RequestFilter::default());
            write_requests_csv(&requests, output)?;

            Ok(())
        })
    }
}
