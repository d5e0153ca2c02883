//! Withdrawal transition engine
//!
//! This module provides the `WithdrawalEngine`, the sole authority for
//! changing a withdrawal request's status. The engine validates the
//! requested edge against the lifecycle state machine, applies the status
//! update and the history append as one atomic store operation, and then
//! emits a best-effort notification.
//!
//! The engine enforces the lifecycle rules:
//! - Requests are created in `PENDIENTE` with their first history entry
//! - Only `PENDIENTE` -> `AUTORIZADO` and `PENDIENTE` -> `RECHAZADO` are
//!   permitted edges; terminal states admit nothing, self-loops are
//!   rejected
//! - Entering `AUTORIZADO` records the deciding actor as `verified_by`

use crate::core::auth::ActorDirectory;
use crate::core::catalog::{StatusCatalog, StatusEntry};
use crate::core::notify::{LogEmitter, NotificationEmitter, TransitionNotice};
use crate::core::query::RequestQuery;
use crate::core::request_store::MemoryRequestStore;
use crate::core::traits::RequestStore;
use crate::types::{
    ActorId, HistoryEntry, NewWithdrawal, OperationKind, OperationRecord, RequestFilter,
    RequestId, WithdrawalError, WithdrawalRequest, WithdrawalStatus,
};
use chrono::Utc;
use std::sync::Arc;

/// Transition engine over a request store
///
/// Coordinates the actor directory (defensive existence checks), the
/// request store (atomic state changes), and the notification emitter
/// (post-commit, best-effort). Role checks happen in the authorization
/// gate before calls reach the engine.
pub struct WithdrawalEngine<S: RequestStore = MemoryRequestStore> {
    store: S,
    catalog: StatusCatalog,
    directory: ActorDirectory,
    emitter: Arc<dyn NotificationEmitter>,
}

impl WithdrawalEngine<MemoryRequestStore> {
    /// Create an engine with an empty in-memory store
    ///
    /// Uses an open actor directory (any recorded actor accepted) and the
    /// logging emitter. Embedders wanting a strict roster or a real
    /// delivery channel use [`WithdrawalEngine::with_directory`] and
    /// [`WithdrawalEngine::with_emitter`].
    pub fn new() -> Self {
        WithdrawalEngine {
            store: MemoryRequestStore::new(),
            catalog: StatusCatalog::new(),
            directory: ActorDirectory::open(),
            emitter: Arc::new(LogEmitter),
        }
    }
}

impl<S: RequestStore> WithdrawalEngine<S> {
    /// Create an engine over an existing store
    pub fn with_store(store: S) -> Self {
        WithdrawalEngine {
            store,
            catalog: StatusCatalog::new(),
            directory: ActorDirectory::open(),
            emitter: Arc::new(LogEmitter),
        }
    }

    /// Replace the actor directory
    pub fn with_directory(mut self, directory: ActorDirectory) -> Self {
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
    /// The request starts in `PENDIENTE` and its first history entry is
    /// written as part of the same insert.
    ///
    /// # Arguments
    ///
    /// * `new` - Creation fields; the id must be unused
    /// * `actor` - The creating actor (already role-checked by the gate)
    ///
    /// # Returns
    ///
    /// The stored request.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The actor is unknown to the directory (`Unauthorized`)
    /// - The request id already exists (`DuplicateRequest`)
    pub fn create(
        &mut self,
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
    /// Validates the edge against the current status, then applies the
    /// status update and history append atomically, conditional on the
    /// status still being the one the validation saw. A concurrent
    /// transition committing in between surfaces as `Conflict`.
    ///
    /// # Arguments
    ///
    /// * `id` - The request to transition
    /// * `target` - The status to enter
    /// * `actor` - The deciding actor (already role-checked by the gate)
    ///
    /// # Returns
    ///
    /// The updated request, including the appended history entry.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The actor is unknown to the directory (`Unauthorized`)
    /// - The request id is unknown (`RequestNotFound`)
    /// - The edge is disallowed or a self-loop (`InvalidTransition`)
    /// - A concurrent transition won the race (`Conflict`)
    pub fn transition(
        &mut self,
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
    /// Dispatches a typed operation record to [`WithdrawalEngine::create`]
    /// or [`WithdrawalEngine::transition`], enforcing the field presence
    /// rules of each operation kind.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` when a required field is absent, plus any
    /// error of the dispatched operation.
    pub fn apply(
        &mut self,
        operation: OperationRecord,
    ) -> Result<WithdrawalRequest, WithdrawalError> {
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
    ///
    /// # Errors
    ///
    /// Returns `RequestNotFound` for unknown ids.
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

    /// Borrow the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read-only query surface over the engine's store
    pub fn query(&self) -> RequestQuery<'_, S> {
        RequestQuery::new(&self.store)
    }

    // Best-effort notification after a committed change. Failures are
    // logged and swallowed; the committed state is never rolled back.
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

impl Default for WithdrawalEngine<MemoryRequestStore> {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a requested edge against the lifecycle state machine
///
/// Permitted edges are `PENDIENTE -> AUTORIZADO` and
/// `PENDIENTE -> RECHAZADO`. Everything else, including self-loops and
/// anything leaving a terminal state, is rejected.
pub(crate) fn validate_edge(
    id: RequestId,
    from: WithdrawalStatus,
    to: WithdrawalStatus,
) -> Result<(), WithdrawalError> {
    let allowed = from == WithdrawalStatus::Pendiente && to.is_terminal();
    if allowed {
        Ok(())
    } else {
        Err(WithdrawalError::invalid_transition(id, from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::{Actor, Role};
    use crate::core::notify::testing::{FailingEmitter, RecordingEmitter};
    use rstest::rstest;

    fn new_withdrawal(id: RequestId) -> NewWithdrawal {
        NewWithdrawal {
            request: id,
            student: 100,
            reporting_teacher: 7,
            guardian: 55,
            cause: "Medical appointment".to_string(),
            guardian_dni: Some("12345678-9".to_string()),
        }
    }

    fn create_op(id: RequestId, actor: ActorId) -> OperationRecord {
        OperationRecord {
            kind: OperationKind::Create,
            request: id,
            student: Some(100),
            reporting_teacher: Some(7),
            guardian: Some(55),
            target: None,
            actor,
            cause: Some("Medical appointment".to_string()),
            guardian_dni: None,
        }
    }

    #[test]
    fn test_create_starts_pending_with_initial_history() {
        let mut engine = WithdrawalEngine::new();

        let request = engine.create(new_withdrawal(1), 7).unwrap();

        assert_eq!(request.id, 1);
        assert_eq!(request.status, WithdrawalStatus::Pendiente);
        assert_eq!(request.history.len(), 1);
        assert_eq!(
            request.last_entry().unwrap().status,
            WithdrawalStatus::Pendiente
        );
        assert!(request.verified_by.is_none());
    }

    #[test]
    fn test_create_duplicate_id_fails() {
        let mut engine = WithdrawalEngine::new();
        engine.create(new_withdrawal(1), 7).unwrap();

        let result = engine.create(new_withdrawal(1), 7);

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            WithdrawalError::DuplicateRequest { request: 1 }
        ));
    }

    #[test]
    fn test_authorize_sets_verified_by_and_appends_history() {
        let mut engine = WithdrawalEngine::new();
        engine.create(new_withdrawal(1), 7).unwrap();

        let updated = engine
            .transition(1, WithdrawalStatus::Autorizado, 42)
            .unwrap();

        assert_eq!(updated.status, WithdrawalStatus::Autorizado);
        assert_eq!(updated.history.len(), 2);
        assert_eq!(updated.history[0].status, WithdrawalStatus::Pendiente);
        assert_eq!(updated.history[1].status, WithdrawalStatus::Autorizado);
        assert_eq!(updated.history[1].actor, 42);
        assert_eq!(updated.verified_by, Some(42));
    }

    #[test]
    fn test_reject_does_not_set_verified_by() {
        let mut engine = WithdrawalEngine::new();
        engine.create(new_withdrawal(1), 7).unwrap();

        let updated = engine
            .transition(1, WithdrawalStatus::Rechazado, 9)
            .unwrap();

        assert_eq!(updated.status, WithdrawalStatus::Rechazado);
        assert_eq!(updated.history.len(), 2);
        assert!(updated.verified_by.is_none());
    }

    #[rstest]
    #[case::to_pending(WithdrawalStatus::Pendiente)]
    #[case::to_authorized(WithdrawalStatus::Autorizado)]
    #[case::to_rejected(WithdrawalStatus::Rechazado)]
    fn test_transition_from_terminal_state_always_fails(#[case] target: WithdrawalStatus) {
        let mut engine = WithdrawalEngine::new();
        engine.create(new_withdrawal(1), 7).unwrap();
        engine
            .transition(1, WithdrawalStatus::Autorizado, 42)
            .unwrap();

        let result = engine.transition(1, target, 9);

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            WithdrawalError::InvalidTransition { .. }
        ));

        // State is unchanged by the failed attempt
        let request = engine.get(1).unwrap();
        assert_eq!(request.status, WithdrawalStatus::Autorizado);
        assert_eq!(request.history.len(), 2);
    }

    #[test]
    fn test_self_transition_fails() {
        let mut engine = WithdrawalEngine::new();
        engine.create(new_withdrawal(1), 7).unwrap();

        let result = engine.transition(1, WithdrawalStatus::Pendiente, 9);

        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err(),
            WithdrawalError::invalid_transition(
                1,
                WithdrawalStatus::Pendiente,
                WithdrawalStatus::Pendiente
            )
        );
    }

    #[test]
    fn test_transition_unknown_request_fails() {
        let mut engine = WithdrawalEngine::new();

        let result = engine.transition(999, WithdrawalStatus::Autorizado, 1);

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            WithdrawalError::RequestNotFound { request: 999 }
        ));
    }

    #[test]
    fn test_engine_revalidates_actor_existence() {
        let directory = ActorDirectory::with_actors([Actor {
            id: 7,
            name: "T. Rojas".to_string(),
            role: Role::Teacher,
        }]);
        let mut engine = WithdrawalEngine::new().with_directory(directory);

        engine.create(new_withdrawal(1), 7).unwrap();

        // Actor 404 passed no gate and is unknown to the roster
        let result = engine.transition(1, WithdrawalStatus::Autorizado, 404);
        assert_eq!(
            result.unwrap_err(),
            WithdrawalError::unauthorized(404, "transition")
        );

        let result = engine.create(new_withdrawal(2), 404);
        assert_eq!(
            result.unwrap_err(),
            WithdrawalError::unauthorized(404, "create")
        );
    }

    #[test]
    fn test_status_always_equals_last_history_entry() {
        let mut engine = WithdrawalEngine::new();

        let created = engine.create(new_withdrawal(1), 7).unwrap();
        assert_eq!(created.status, created.last_entry().unwrap().status);

        let updated = engine
            .transition(1, WithdrawalStatus::Rechazado, 9)
            .unwrap();
        assert_eq!(updated.status, updated.last_entry().unwrap().status);
    }

    #[test]
    fn test_history_never_shrinks_on_failed_operations() {
        let mut engine = WithdrawalEngine::new();
        engine.create(new_withdrawal(1), 7).unwrap();
        engine
            .transition(1, WithdrawalStatus::Autorizado, 42)
            .unwrap();

        // A failed transition and a failed duplicate create
        let _ = engine.transition(1, WithdrawalStatus::Rechazado, 9);
        let _ = engine.create(new_withdrawal(1), 7);

        let request = engine.get(1).unwrap();
        assert_eq!(request.history.len(), 2);
        assert_eq!(request.history[0].status, WithdrawalStatus::Pendiente);
        assert_eq!(request.history[1].status, WithdrawalStatus::Autorizado);
    }

    #[test]
    fn test_notifications_emitted_for_committed_changes_only() {
        let emitter = Arc::new(RecordingEmitter::new());
        let mut engine = WithdrawalEngine::new().with_emitter(emitter.clone());

        engine.create(new_withdrawal(1), 7).unwrap();
        engine
            .transition(1, WithdrawalStatus::Autorizado, 42)
            .unwrap();
        let _ = engine.transition(1, WithdrawalStatus::Rechazado, 9);

        let notices = emitter.notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].status, WithdrawalStatus::Pendiente);
        assert_eq!(notices[0].actor, 7);
        assert_eq!(notices[1].status, WithdrawalStatus::Autorizado);
        assert_eq!(notices[1].actor, 42);
    }

    #[test]
    fn test_notification_failure_never_fails_the_transition() {
        let mut engine = WithdrawalEngine::new().with_emitter(Arc::new(FailingEmitter));

        engine.create(new_withdrawal(1), 7).unwrap();
        let updated = engine
            .transition(1, WithdrawalStatus::Autorizado, 42)
            .unwrap();

        // The transition committed despite the emitter failing
        assert_eq!(updated.status, WithdrawalStatus::Autorizado);
        assert_eq!(engine.get(1).unwrap().status, WithdrawalStatus::Autorizado);
    }

    #[test]
    fn test_apply_dispatches_create_and_transition() {
        let mut engine = WithdrawalEngine::new();

        engine.apply(create_op(1, 7)).unwrap();

        let updated = engine
            .apply(OperationRecord {
                kind: OperationKind::Transition,
                request: 1,
                student: None,
                reporting_teacher: None,
                guardian: None,
                target: Some(WithdrawalStatus::Autorizado),
                actor: 42,
                cause: None,
                guardian_dni: None,
            })
            .unwrap();

        assert_eq!(updated.status, WithdrawalStatus::Autorizado);
        assert_eq!(updated.history.len(), 2);
    }

    #[rstest]
    #[case::missing_student("student")]
    #[case::missing_teacher("teacher")]
    #[case::missing_guardian("guardian")]
    #[case::missing_cause("cause")]
    fn test_apply_create_requires_all_fields(#[case] field: &str) {
        let mut engine = WithdrawalEngine::new();

        let mut operation = create_op(1, 7);
        match field {
            "student" => operation.student = None,
            "teacher" => operation.reporting_teacher = None,
            "guardian" => operation.guardian = None,
            "cause" => operation.cause = None,
            _ => unreachable!(),
        }

        let result = engine.apply(operation);
        assert_eq!(
            result.unwrap_err(),
            WithdrawalError::missing_field("create", field, 1)
        );
    }

    #[test]
    fn test_apply_transition_requires_target_status() {
        let mut engine = WithdrawalEngine::new();
        engine.apply(create_op(1, 7)).unwrap();

        let result = engine.apply(OperationRecord {
            kind: OperationKind::Transition,
            request: 1,
            student: None,
            reporting_teacher: None,
            guardian: None,
            target: None,
            actor: 42,
            cause: None,
            guardian_dni: None,
        });

        assert_eq!(
            result.unwrap_err(),
            WithdrawalError::missing_field("transition", "status", 1)
        );
    }

    #[test]
    fn test_list_and_statuses() {
        let mut engine = WithdrawalEngine::new();
        engine.create(new_withdrawal(2), 7).unwrap();
        engine.create(new_withdrawal(1), 7).unwrap();

        let all = engine.list(&RequestFilter::default());
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, 1);
        assert_eq!(all[1].id, 2);

        let statuses = engine.statuses();
        assert_eq!(statuses.len(), 3);
        assert_eq!(statuses[0].status, WithdrawalStatus::Pendiente);
    }

    #[test]
    fn test_query_surface_over_engine_store() {
        let mut engine = WithdrawalEngine::new();
        engine.create(new_withdrawal(1), 7).unwrap();
        engine
            .transition(1, WithdrawalStatus::Autorizado, 42)
            .unwrap();

        let query = engine.query();
        assert_eq!(query.by_student(100).len(), 1);
        assert_eq!(query.by_status(WithdrawalStatus::Autorizado)[0].id, 1);
        assert_eq!(query.fetch(1).unwrap().history.len(), 2);
    }
}
