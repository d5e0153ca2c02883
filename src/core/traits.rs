//! Core traits for request storage
//!
//! This module defines the storage abstraction that allows the
//! single-threaded and the concurrent store to be used interchangeably
//! by the engine and the query surface.

use crate::types::{
    HistoryEntry, RequestFilter, RequestId, WithdrawalError, WithdrawalRequest, WithdrawalStatus,
};

/// Trait for storing withdrawal requests and their audit history
///
/// Implementations own both the request fields and the history entries;
/// the two are updated together. There is no delete operation: requests
/// only ever change through [`RequestStore::apply_transition`].
pub trait RequestStore {
    /// Insert a newly created request
    ///
    /// Fails with `DuplicateRequest` when the id is already present;
    /// the existing request is left untouched.
    fn insert(&mut self, request: WithdrawalRequest) -> Result<(), WithdrawalError>;

    /// Fetch a snapshot of a request with its full history
    ///
    /// Returns an owned copy; mutating it does not affect the store.
    fn get(&self, id: RequestId) -> Option<WithdrawalRequest>;

    /// Atomically apply a status transition
    ///
    /// Appends `entry` to the history and updates the request's status in
    /// one step, conditional on the request still holding `expected`
    /// (compare-and-swap). When the entered status is the terminal
    /// confirmed state, the entry's actor is recorded as `verified_by`.
    ///
    /// # Errors
    ///
    /// * `RequestNotFound` - the id is unknown
    /// * `Conflict` - the request no longer holds `expected`
    fn apply_transition(
        &mut self,
        id: RequestId,
        expected: WithdrawalStatus,
        entry: HistoryEntry,
    ) -> Result<WithdrawalRequest, WithdrawalError>;

    /// Snapshot all requests matching the filter
    ///
    /// Results are owned copies sorted by request id.
    fn list(&self, filter: &RequestFilter) -> Vec<WithdrawalRequest>;
}

/// Commit a transition on a request held exclusively by the caller
///
/// Shared by both store implementations so the compare-and-swap check,
/// the status/history coupling, and the `verified_by` discipline live in
/// one place. The caller must hold the request exclusively (a `&mut`
/// borrow from the map, or a locked concurrent-map entry).
///
/// History timestamps stay ascending: an entry timestamped before the
/// current last entry is clamped to the last entry's timestamp.
pub(crate) fn commit_transition(
    request: &mut WithdrawalRequest,
    expected: WithdrawalStatus,
    mut entry: HistoryEntry,
) -> Result<(), WithdrawalError> {
    if request.status != expected {
        return Err(WithdrawalError::conflict(
            request.id,
            expected,
            request.status,
        ));
    }

    if let Some(last) = request.history.last() {
        if entry.at < last.at {
            entry.at = last.at;
        }
    }

    if entry.status == WithdrawalStatus::Autorizado {
        request.verified_by = Some(entry.actor);
    }
    request.status = entry.status;
    request.history.push(entry);

    Ok(())
}
