//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `status`: Withdrawal lifecycle statuses
//! - `request`: Withdrawal requests, audit history, and identifiers
//! - `operation`: Typed operation records for the batch import surface
//! - `error`: Error types for the withdrawal engine

pub mod error;
pub mod operation;
pub mod request;
pub mod status;

pub use error::WithdrawalError;
pub use operation::{OperationKind, OperationRecord};
pub use request::{
    ActorId, GuardianId, HistoryEntry, NewWithdrawal, RequestFilter, RequestId, StudentId,
    WithdrawalRequest,
};
pub use status::WithdrawalStatus;
