//! Error types for the withdrawal engine
//!
//! This module defines all error types that can occur while processing
//! withdrawal operations. Errors are designed to be descriptive and
//! user-friendly for CLI output.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: file not found, permission denied, etc.
//! - **CSV Parsing Errors**: malformed CSV, invalid data types, etc.
//! - **Business-rule Errors**: unknown requests, disallowed transitions,
//!   lost concurrent races, duplicate ids
//! - **Authorization Errors**: unauthenticated or unauthorized callers

use crate::types::request::{ActorId, RequestId};
use crate::types::status::WithdrawalStatus;
use thiserror::Error;

/// Main error type for the withdrawal engine
///
/// This enum represents all possible errors that can occur while applying
/// withdrawal operations. Each variant includes relevant context to help
/// diagnose and resolve the issue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WithdrawalError {
    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    ///
    /// This is typically a fatal error (file permissions, disk full, etc.).
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// This is a recoverable error - the malformed row is skipped
    /// and processing continues with the next row.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Invalid operation kind encountered
    ///
    /// This is a recoverable error - the invalid row is skipped
    /// and processing continues.
    #[error("Invalid operation '{op}'{}", request.map(|r| format!(" for request {}", r)).unwrap_or_default())]
    InvalidOperation {
        /// The invalid operation string
        op: String,
        /// Request ID (if available)
        request: Option<RequestId>,
    },

    /// A required field is missing for an operation that needs it
    ///
    /// Create operations require student, teacher, guardian, and cause;
    /// transition operations require a target status.
    /// This is a recoverable error.
    #[error("{op} operation on request {request} requires field '{field}'")]
    MissingField {
        /// Operation kind that requires the field
        op: String,
        /// The missing field name
        field: String,
        /// Request ID
        request: RequestId,
    },

    /// Status code not present in the catalog
    ///
    /// Covers both unknown and retired codes. This is a recoverable
    /// error - the referencing operation is rejected.
    #[error("Unknown status code '{code}'")]
    UnknownStatus {
        /// The unresolvable status code
        code: String,
    },

    /// Request ID could not be resolved
    ///
    /// This is a recoverable error - the operation is rejected.
    #[error("Withdrawal request {request} not found")]
    RequestNotFound {
        /// The request ID that was not found
        request: RequestId,
    },

    /// The requested status change is not a permitted edge
    ///
    /// Either the current status is terminal, or the transition is a
    /// self-loop. This is a recoverable error - the request state
    /// remains unchanged.
    #[error("Invalid transition for request {request}: {from} -> {to}")]
    InvalidTransition {
        /// Request ID
        request: RequestId,
        /// Status the request currently holds
        from: WithdrawalStatus,
        /// Status that was requested
        to: WithdrawalStatus,
    },

    /// Lost a concurrent race on the same request
    ///
    /// Another transition committed between this caller's read and its
    /// write. The caller observed stale state; nothing was overwritten.
    #[error("Concurrent transition conflict on request {request}: expected {expected}, found {found}")]
    Conflict {
        /// Request ID
        request: RequestId,
        /// Status the losing caller based its transition on
        expected: WithdrawalStatus,
        /// Status actually committed by the winning caller
        found: WithdrawalStatus,
    },

    /// A request with this ID already exists
    ///
    /// Request IDs must be unique. This is a recoverable error -
    /// the duplicate create is rejected and the original kept.
    #[error("Duplicate withdrawal request {request}")]
    DuplicateRequest {
        /// The duplicated request ID
        request: RequestId,
    },

    /// No credential was presented or the credential is unknown
    ///
    /// Raised by the authorization gate before any engine call.
    #[error("Unauthenticated: {reason}")]
    Unauthenticated {
        /// Why authentication failed
        reason: String,
    },

    /// The presented credential is malformed
    ///
    /// Raised by the authorization gate before any engine call.
    #[error("Invalid credential")]
    InvalidCredential,

    /// The actor is not permitted to perform the action
    ///
    /// Raised by the gate for role violations, and defensively by the
    /// engine when the acting identity cannot be resolved.
    #[error("Actor {actor} is not authorized to {action}")]
    Unauthorized {
        /// The offending actor ID
        actor: ActorId,
        /// The action that was denied
        action: String,
    },

    /// The backing store failed
    ///
    /// Surfaced to the caller without retrying; retry policy belongs
    /// to the caller.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// Description of the store failure
        message: String,
    },
}

// Conversion from io::Error to WithdrawalError
impl From<std::io::Error> for WithdrawalError {
    fn from(error: std::io::Error) -> Self {
        WithdrawalError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to WithdrawalError
impl From<csv::Error> for WithdrawalError {
    fn from(error: csv::Error) -> Self {
        // Extract line number if available
        let line = error.position().map(|pos| pos.line());

        WithdrawalError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl WithdrawalError {
    /// Create a RequestNotFound error
    pub fn request_not_found(request: RequestId) -> Self {
        WithdrawalError::RequestNotFound { request }
    }

    /// Create an InvalidTransition error
    pub fn invalid_transition(
        request: RequestId,
        from: WithdrawalStatus,
        to: WithdrawalStatus,
    ) -> Self {
        WithdrawalError::InvalidTransition { request, from, to }
    }

    /// Create a Conflict error
    pub fn conflict(
        request: RequestId,
        expected: WithdrawalStatus,
        found: WithdrawalStatus,
    ) -> Self {
        WithdrawalError::Conflict {
            request,
            expected,
            found,
        }
    }

    /// Create a DuplicateRequest error
    pub fn duplicate_request(request: RequestId) -> Self {
        WithdrawalError::DuplicateRequest { request }
    }

    /// Create an UnknownStatus error
    pub fn unknown_status(code: &str) -> Self {
        WithdrawalError::UnknownStatus {
            code: code.to_string(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(op: &str, field: &str, request: RequestId) -> Self {
        WithdrawalError::MissingField {
            op: op.to_string(),
            field: field.to_string(),
            request,
        }
    }

    /// Create an InvalidOperation error
    pub fn invalid_operation(op: &str, request: Option<RequestId>) -> Self {
        WithdrawalError::InvalidOperation {
            op: op.to_string(),
            request,
        }
    }

    /// Create an Unauthorized error
    pub fn unauthorized(actor: ActorId, action: &str) -> Self {
        WithdrawalError::Unauthorized {
            actor,
            action: action.to_string(),
        }
    }

    /// Create an Unauthenticated error
    pub fn unauthenticated(reason: &str) -> Self {
        WithdrawalError::Unauthenticated {
            reason: reason.to_string(),
        }
    }

    /// Create a StoreUnavailable error
    pub fn store_unavailable(message: &str) -> Self {
        WithdrawalError::StoreUnavailable {
            message: message.to_string(),
        }
    }
}
