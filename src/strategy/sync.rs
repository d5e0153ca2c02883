//! Synchronous processing strategy
//!
//! This module provides a synchronous, single-threaded implementation of
//! the ProcessingStrategy trait. It orchestrates import processing by
//! coordinating between the SyncReader (for CSV input) and the
//! WithdrawalEngine (for lifecycle rules).
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Lifecycle rules to `WithdrawalEngine` (business logic)
//! - CSV output to `csv_format::write_requests_csv` (format handling)
//!
//! # Memory Efficiency
//!
//! Rows are processed one at a time via the reader's iterator; memory
//! usage is proportional to the number of requests, not to the number of
//! recorded operations.

use crate::core::WithdrawalEngine;
use crate::io::csv_format::write_requests_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use crate::types::RequestFilter;
use std::io::Write;
use std::path::Path;

/// Synchronous processing strategy
///
/// Implements the ProcessingStrategy trait using single-threaded,
/// synchronous processing. Orchestrates the flow between CSV reading,
/// engine processing, and report generation.
///
/// # Examples
///
/// ```no_run
/// use retiro_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy;
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("operations.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Process operations from input file and write the report to output
    ///
    /// This method orchestrates the complete synchronous pipeline:
    /// 1. Creates a SyncReader to stream operation rows from the CSV file
    /// 2. Creates a WithdrawalEngine to apply operations
    /// 3. Iterates through rows, applying each through the engine
    /// 4. Collects final request states from the engine
    /// 5. Writes the report using csv_format::write_requests_csv
    ///
    /// # Error Handling
    ///
    /// Fatal errors (file not found, I/O errors) are returned
    /// immediately. Individual operation errors are logged and processing
    /// continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        // Create the withdrawal engine
        let mut engine = WithdrawalEngine::new();

        // Create sync reader for streaming CSV input
        let reader = SyncReader::new(input_path)?;

        // Apply each recorded operation through the engine
        for result in reader {
            match result {
                Ok(operation) => {
                    // Business-rule rejections are recoverable; the row is
                    // skipped and the affected request stays as it was
                    if let Err(e) = engine.apply(operation) {
                        tracing::warn!("Operation error: {e}");
                    }
                }
                Err(e) => {
                    tracing::warn!("CSV row error: {e}");
                }
            }
        }

        // Collect final request states and write the report
        let requests = engine.list(&RequestFilter::default());
        write_requests_csv(&requests, output)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "op,request,student,teacher,guardian,status,actor,cause,dni\n";

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_sync_strategy_processes_create_and_authorize() {
        let csv_content = format!(
            "{HEADER}\
             create,1,100,7,55,,7,Medical appointment,\n\
             transition,1,,,,autorizado,42,,\n"
        );
        let file = create_temp_csv(&csv_content);

        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();

        let result = strategy.process(file.path(), &mut output);
        assert!(result.is_ok());

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("1,100,55,AUTORIZADO,42,PENDIENTE>AUTORIZADO"));
    }

    #[test]
    fn test_sync_strategy_handles_missing_file() {
        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to open file"));
    }

    #[test]
    fn test_sync_strategy_skips_invalid_transition_and_keeps_state() {
        let csv_content = format!(
            "{HEADER}\
             create,1,100,7,55,,7,Medical appointment,\n\
             transition,1,,,,rechazado,9,,\n\
             transition,1,,,,autorizado,42,,\n"
        );
        let file = create_temp_csv(&csv_content);

        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();

        strategy.process(file.path(), &mut output).unwrap();

        // The second transition lost: the request stayed rejected
        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("1,100,55,RECHAZADO,,PENDIENTE>RECHAZADO"));
    }

    #[test]
    fn test_sync_strategy_continues_on_malformed_row() {
        let csv_content = format!(
            "{HEADER}\
             create,1,100,7,55,,7,Medical appointment,\n\
             create,abc,100,7,55,,7,Bad id,\n\
             create,3,300,7,56,,7,Early pickup,\n"
        );
        let file = create_temp_csv(&csv_content);

        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();

        let result = strategy.process(file.path(), &mut output);
        assert!(result.is_ok());

        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.contains("\n1,"));
        assert!(output_str.contains("\n3,"));
        assert!(!output_str.contains("Bad id"));
    }

    #[test]
    fn test_sync_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncProcessingStrategy>();
    }
}
