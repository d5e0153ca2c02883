//! Student Withdrawal Engine Library
//! # Overview
//!
//! This library manages the lifecycle of student withdrawal (retiro)
//! requests: creation, validated status transitions with an append-only
//! audit history, role-based authorization, read-only query projections,
//! and best-effort transition notifications. A CSV batch import surface
//! with sync and async strategies replays recorded operations.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (WithdrawalRequest, HistoryEntry, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Transition engine, sole authority for status changes
//!   - [`core::catalog`] - Immutable status catalog
//!   - [`core::request_store`] - Request storage with audit history
//!   - [`core::auth`] - Actor directory and authorization gate
//!   - [`core::notify`] - Best-effort transition notifications
//!   - [`core::query`] - Read-only projections
//! - [`io`] - I/O handling with pluggable processing strategies
//! - [`strategy`] - Sync and async import pipelines
//!
//! # Lifecycle
//!
//! A withdrawal request is created in `PENDIENTE` by a teacher and moves
//! through exactly one of two permitted edges:
//!
//! - **PENDIENTE -> AUTORIZADO**: approved; the deciding actor is
//!   recorded as the guardian identity verifier
//! - **PENDIENTE -> RECHAZADO**: denied
//!
//! Both target states are terminal. Every committed change appends one
//! audit history entry; the current status always equals the status of
//! the most recent entry, and requests are never deleted.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use crate::core::{
    AsyncWithdrawalEngine, AuthorizationGate, MemoryRequestStore, RequestQuery, RequestStore,
    SharedRequestStore, StatusCatalog, WithdrawalEngine,
};
pub use crate::io::write_requests_csv;
pub use crate::types::{
    ActorId, GuardianId, HistoryEntry, NewWithdrawal, OperationRecord, RequestFilter, RequestId,
    StudentId, WithdrawalError, WithdrawalRequest, WithdrawalStatus,
};
