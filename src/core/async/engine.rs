//! Transition engine for concurrent batch processing
//!
//! This module provides the `AsyncWithdrawalEngine` struct, which applies
//! withdrawal operations against the thread-safe `SharedRequestStore`.
//!
//! # Design
//!
//! The engine carries the same lifecycle rules as the single-threaded
//! [`crate::core::engine::WithdrawalEngine`]; the difference is the
//! concurrency model. All state is behind `Arc`, the engine is cheap to
//! clone, and every operation takes `&self`, so one engine can serve many
//! tokio tasks at once.
//!
//! # Racing transitions
//!
//! Validation reads a snapshot of the request, then the store re-checks
//! the expected status under the entry lock. When two callers race on the
//! same request, exactly one commits; the loser observes `Conflict` (its
//! snapshot went stale between validation and write) or
//! `InvalidTransition` (the winner's terminal status was already visible
//! when the loser validated).

use std::sync::Arc;

use super::SharedRequestStore;
use crate::core::auth::ActorDirectory;
use crate::core::catalog::{StatusCatalog, StatusEntry};
use crate::core::engine::validate_edge;
use crate::core::notify::{LogEmitter, NotificationEmitter, TransitionNotice};
use crate::types::{
    ActorId, HistoryEntry, NewWithdrawal, OperationKind, OperationRecord, RequestFilter,
    RequestId, WithdrawalError, WithdrawalRequest, WithdrawalStatus,
};
use chrono::Utc;

/// Thread-safe withdrawal transition engine
///
/// Safe to clone and use from multiple threads/tasks concurrently. All
/// operations on requests are synchronized through the underlying
/// DashMap-backed store; the compare-and-swap in the store guarantees
/// at-most-one committed transition per race.
#[derive(Clone)]
pub struct AsyncWithdrawalEngine {
    /// Thread-safe request storage
    store: Arc<SharedRequestStore>,

    /// Immutable status catalog
    catalog: StatusCatalog,

    /// Roster for the defensive actor existence check
    directory: Arc<ActorDirectory>,

    /// Post-commit notification receiver
    emitter: Arc<dyn NotificationEmitter>,
}

impl AsyncWithdrawalEngine {
    /// Create a new engine over the given store
    ///
    /// Uses an open actor directory and the logging emitter; see
    /// [`AsyncWithdrawalEngine::with_directory`] and
    /// [`AsyncWithdrawalEngine::with_emitter`].
    pub fn new(store: Arc<SharedRequestStore>) -> Self {
        Self {
            store,
            catalog: StatusCatalog::new(),
            directory: Arc::new(ActorDirectory::open()),
            emitter: Arc::new(LogEmitter),
        }
    }

    /// Replace the actor directory
    pub fn with_directory(mut self, directory: Arc<ActorDirectory>) -> Self {
        self.directory = directory;
        self
    }

    /// Replace the notification emitter
    pub fn with_emitter(mut self, emitter: Arc<dyn NotificationEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    /// Open a new withdrawal request
    ///
    /// Same contract as the single-threaded engine; racing creates with
    /// the same id resolve to exactly one winner.
    pub fn create(
        &self,
        new: NewWithdrawal,
        actor: ActorId,
    ) -> Result<WithdrawalRequest, WithdrawalError> {
        self.directory.verify(actor, "create")?;

        let request = WithdrawalRequest::open(new, actor, Utc::now());
        self.store.insert(request.clone())?;

        self.emit(TransitionNotice {
            request: request.id,
            status: request.status,
            actor,
        });

        Ok(request)
    }

    /// Apply a status transition to an existing request
    ///
    /// Validates against a snapshot, then commits conditional on the
    /// snapshot's status via the store's compare-and-swap.
    ///
    /// # Errors
    ///
    /// * `Unauthorized` - the actor is unknown to the directory
    /// * `RequestNotFound` - the request id is unknown
    /// * `InvalidTransition` - the edge is disallowed or a self-loop
    /// * `Conflict` - a concurrent transition won the race
    pub fn transition(
        &self,
        id: RequestId,
        target: WithdrawalStatus,
        actor: ActorId,
    ) -> Result<WithdrawalRequest, WithdrawalError> {
        self.directory.verify(actor, "transition")?;

        let current = self
            .store
            .get(id)
            .ok_or_else(|| WithdrawalError::request_not_found(id))?;

        validate_edge(id, current.status, target)?;

        let updated = self.store.apply_transition(
            id,
            current.status,
            HistoryEntry {
                status: target,
                actor,
                at: Utc::now(),
            },
        )?;

        self.emit(TransitionNotice {
            request: updated.id,
            status: updated.status,
            actor,
        });

        Ok(updated)
    }

    /// Apply a recorded operation
    ///
    /// Dispatches a typed operation record to `create` or `transition`,
    /// enforcing the field presence rules of each operation kind.
    pub fn apply(&self, operation: OperationRecord) -> Result<WithdrawalRequest, WithdrawalError> {
        match operation.kind {
            OperationKind::Create => {
                let student = operation.student.ok_or_else(|| {
                    WithdrawalError::missing_field("create", "student", operation.request)
                })?;
                let reporting_teacher = operation.reporting_teacher.ok_or_else(|| {
                    WithdrawalError::missing_field("create", "teacher", operation.request)
                })?;
                let guardian = operation.guardian.ok_or_else(|| {
                    WithdrawalError::missing_field("create", "guardian", operation.request)
                })?;
                let cause = operation.cause.ok_or_else(|| {
                    WithdrawalError::missing_field("create", "cause", operation.request)
                })?;

                self.create(
                    NewWithdrawal {
                        request: operation.request,
                        student,
                        reporting_teacher,
                        guardian,
                        cause,
                        guardian_dni: operation.guardian_dni,
                    },
                    operation.actor,
                )
            }
            OperationKind::Transition => {
                let target = operation.target.ok_or_else(|| {
                    WithdrawalError::missing_field("transition", "status", operation.request)
                })?;

                self.transition(operation.request, target, operation.actor)
            }
        }
    }

    /// Fetch a request with its full ordered history
    pub fn get(&self, id: RequestId) -> Result<WithdrawalRequest, WithdrawalError> {
        self.store
            .get(id)
            .ok_or_else(|| WithdrawalError::request_not_found(id))
    }

    /// List requests matching a filter, sorted by request id
    pub fn list(&self, filter: &RequestFilter) -> Vec<WithdrawalRequest> {
        self.store.list(filter)
    }

    /// The status catalog in presentation order
    pub fn statuses(&self) -> &[StatusEntry] {
        self.catalog.statuses()
    }

    fn emit(&self, notice: TransitionNotice) {
        if let Err(error) = self.emitter.notify(&notice) {
            tracing::warn!(
                request = notice.request,
                status = %notice.status,
                %error,
                "notification emitter failed"
            );
        }
    }
}
