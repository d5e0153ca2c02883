//! Withdrawal request storage
//!
//! This module provides the `MemoryRequestStore` component that keeps
//! withdrawal requests together with their append-only audit history.
//! The store is the durability boundary of the engine: status updates and
//! history appends happen in a single step, and no delete path exists.
//!
//! # Duplicate Handling
//!
//! Request ids are unique. Inserting a request whose id is already present
//! is rejected and the stored request is left untouched.

use crate::core::traits::{commit_transition, RequestStore};
use crate::types::{
    HistoryEntry, RequestFilter, RequestId, WithdrawalError, WithdrawalRequest, WithdrawalStatus,
};
use std::collections::HashMap;

/// Single-threaded request store
///
/// Maintains a HashMap of request id to withdrawal request. Supports
/// inserting new requests, snapshotting, filtered listing, and atomic
/// status transitions.
pub struct MemoryRequestStore {
    /// Map of request id to stored request
    requests: HashMap<RequestId, WithdrawalRequest>,
}

impl MemoryRequestStore {
    /// Create a new empty request store
    pub fn new() -> Self {
        MemoryRequestStore {
            requests: HashMap::new(),
        }
    }

    /// Number of stored requests
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether the store holds no requests
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl RequestStore for MemoryRequestStore {
    /// Insert a newly created request
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRequest` if a request with the same id already
    /// exists; the existing request is kept.
    fn insert(&mut self, request: WithdrawalRequest) -> Result<(), WithdrawalError> {
        if self.requests.contains_key(&request.id) {
            return Err(WithdrawalError::duplicate_request(request.id));
        }
        self.requests.insert(request.id, request);
        Ok(())
    }

    /// Get an owned snapshot of a stored request
    fn get(&self, id: RequestId) -> Option<WithdrawalRequest> {
        self.requests.get(&id).cloned()
    }

    /// Atomically apply a status transition
    ///
    /// The status field and the history append are written together;
    /// on any error the request is left exactly as it was.
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
    ) -> Result<WithdrawalRequest, WithdrawalError> {
        let request = self
            .requests
            .get_mut(&id)
            .ok_or_else(|| WithdrawalError::request_not_found(id))?;

        commit_transition(request, expected, entry)?;
        Ok(request.clone())
    }

    /// Snapshot all requests matching the filter, sorted by request id
    fn list(&self, filter: &RequestFilter) -> Vec<WithdrawalRequest> {
        let mut requests: Vec<WithdrawalRequest> = self
            .requests
            .values()
            .filter(|request| filter.matches(request))
            .cloned()
            .collect();
        requests.sort_by_key(|request| request.id);
        requests
    }
}

impl Default for MemoryRequestStore {
    fn default() -> Self {
        Self::new()
    }
}
