//! Concurrent implementations of core components
//!
//! This module provides thread-safe implementations of the withdrawal
//! lifecycle components using DashMap for locking.
//!
//! # Architecture
//!
//! The concurrent implementations keep the same semantics as the
//! single-threaded versions but with concurrent data structures:
//!
//! - **SharedRequestStore**: Thread-safe request storage using DashMap
//! - **AsyncWithdrawalEngine**: Arc-shared transition engine
//! - **BatchProcessor**: Request-partitioned concurrent batch processing
//!
//! # Thread Safety
//!
//! All components are designed for safe concurrent access:
//! - Operations on different requests proceed in parallel
//! - Operations on the same request are serialized by per-entry locking
//! - Racing transitions are resolved by compare-and-swap: exactly one
//!   commits, the loser observes a conflict

pub mod batch_processor;
pub mod engine;
pub mod request_store;

pub use batch_processor::BatchProcessor;
pub use engine::AsyncWithdrawalEngine;
pub use request_store::SharedRequestStore;
