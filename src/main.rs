//! Student Withdrawal Engine CLI
//!
//! Command-line interface for replaying recorded withdrawal operations
//! from CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > requests.csv
//! cargo run -- --strategy sync operations.csv > requests.csv
//! cargo run -- --strategy async operations.csv > requests.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 operations.csv > requests.csv
//! ```
//!
//! The program reads recorded operations from the input CSV file, applies
//! them through the withdrawal engine using the selected processing
//! strategy, and outputs the final request states to stdout. Diagnostics
//! go to stderr; verbosity is controlled with `RUST_LOG`.
//!
//! # Processing Strategies
//!
//! - **sync**: Synchronous CSV parsing with single-threaded processing
//! - **async**: Asynchronous batch processing with multi-threaded
//!   parallelism (default)
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use retiro_engine::cli;
use retiro_engine::strategy;
use std::process;

fn main() {
    // Logs go to stderr so stdout stays a clean CSV report
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Parse command-line arguments using clap
    let args = cli::parse_args();

    // Create the appropriate processing strategy based on CLI arguments
    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    // Apply the recorded operations using the selected strategy
    // Output goes to stdout
    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
