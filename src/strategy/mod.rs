//! Processing strategy module for batch operation imports
//!
//! This module defines the Strategy pattern for complete import pipelines,
//! encompassing both CSV parsing and engine processing. This allows
//! different processing implementations (synchronous, asynchronous batch)
//! to be selected at runtime.

use crate::cli::StrategyType;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete import pipelines
///
/// This trait defines the interface for different import implementations.
/// Each strategy must be able to read recorded operations from a CSV file,
/// apply them through the withdrawal engine, and write the final request
/// states to output.
pub trait ProcessingStrategy: Send + Sync {
    /// Process operations from input file and write the report to output
    ///
    /// This method reads operation rows from the specified CSV file,
    /// applies them through the withdrawal engine, and writes the final
    /// request states to the provided output writer.
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the input CSV file of recorded operations
    /// * `output` - Mutable reference to a writer for the request report
    ///
    /// # Returns
    ///
    /// * `Ok(())` if processing completed (possibly with recoverable,
    ///   logged row errors)
    /// * `Err(String)` if a fatal error occurred (file not found, I/O
    ///   error, etc.)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened (file not found, permission
    ///   denied)
    /// - A fatal I/O error occurs during reading or writing
    /// - Output cannot be written
    ///
    /// Individual operation errors must not cause this method to return
    /// an error; they are logged and processing continues with the next
    /// row.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// Factory selecting and instantiating the appropriate strategy
/// implementation at runtime from the provided strategy type and optional
/// configuration.
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy (Sync or Async)
/// * `config` - Optional configuration for async batch processing
///   (ignored for sync)
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}
