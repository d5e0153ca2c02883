//! Core business logic module
//!
//! This module contains the core withdrawal lifecycle components:
//! - `traits` - Storage abstraction shared by both store implementations
//! - `catalog` - Immutable status catalog (codes, display order)
//! - `engine` - Transition engine, the sole authority for status changes
//! - `request_store` - Request storage with append-only audit history
//! - `auth` - Actor directory and bearer-token authorization gate
//! - `notify` - Best-effort transition notifications
//! - `query` - Read-only projections over a store
//! - `async` - Concurrent implementations for batch processing

pub mod auth;
pub mod r#async;
pub mod catalog;
pub mod engine;
pub mod notify;
pub mod query;
pub mod request_store;
pub mod traits;

pub use auth::{Action, Actor, ActorDirectory, AuthorizationGate, Identity, Role};
pub use catalog::{StatusCatalog, StatusEntry};
pub use engine::WithdrawalEngine;
pub use notify::{LogEmitter, NotificationEmitter, TransitionNotice};
pub use query::RequestQuery;
pub use r#async::{AsyncWithdrawalEngine, BatchProcessor, SharedRequestStore};
pub use request_store::MemoryRequestStore;
pub use traits::RequestStore;
