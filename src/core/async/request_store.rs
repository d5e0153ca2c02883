//! Thread-safe request storage for concurrent batch processing
//!
//! This module provides the `SharedRequestStore` struct, which stores
//! withdrawal requests using concurrent data structures to enable safe
//! multi-threaded access.
//!
//! # Design
//!
//! The `SharedRequestStore` uses `DashMap` (a concurrent HashMap) to
//! provide thread-safe request storage with fine-grained locking. Multiple
//! threads can safely work on different requests concurrently, while
//! operations on the same request are serialized by the entry lock.
//!
//! # Atomicity
//!
//! A transition's status update and history append happen together while
//! the entry lock is held, conditional on the expected status still being
//! current (compare-and-swap). Readers therefore observe either the full
//! pre-transition state or the full post-transition state, never a torn
//! mix, and a losing concurrent writer gets a conflict instead of
//! silently overwriting history.

use crate::core::traits::{commit_transition, RequestStore};
use crate::types::{
    HistoryEntry, RequestFilter, RequestId, WithdrawalError, WithdrawalRequest, WithdrawalStatus,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Thread-safe request store for concurrent batch processing
///
/// `SharedRequestStore` provides concurrent access to withdrawal requests
/// using `DashMap` for fine-grained locking. Multiple threads can safely
/// access different requests simultaneously, while operations on the same
/// request are automatically serialized.
#[derive(Debug, Default)]
pub struct SharedRequestStore {
    /// Concurrent map of request id to stored request
    ///
    /// DashMap provides fine-grained locking through internal sharding,
    /// allowing concurrent access to different requests without global
    /// locks.
    requests: DashMap<RequestId, WithdrawalRequest>,
}

impl SharedRequestStore {
    /// Create a new empty SharedRequestStore
    pub fn new() -> Self {
        Self {
            requests: DashMap::new(),
        }
    }

    /// Insert a newly created request
    ///
    /// Thread-safe: if two threads race to insert the same id, exactly
    /// one wins and the other receives `DuplicateRequest`.
    pub fn insert(&self, request: WithdrawalRequest) -> Result<(), WithdrawalError> {
        match self.requests.entry(request.id) {
            Entry::Occupied(_) => Err(WithdrawalError::duplicate_request(request.id)),
            Entry::Vacant(slot) => {
                slot.insert(request);
                Ok(())
            }
        }
    }

    /// Get an owned snapshot of a stored request
    ///
    /// The snapshot is taken under the entry lock, so it is always a
    /// consistent status/history pair; concurrent transitions committing
    /// afterwards are not reflected in the returned value.
    pub fn get(&self, id: RequestId) -> Option<WithdrawalRequest> {
        self.requests.get(&id).map(|entry| entry.value().clone())
    }

    /// Atomically apply a status transition
    ///
    /// Runs under the request's entry lock: the expected status is
    /// re-validated, then the status field and the history entry are
    /// written together. No other thread can observe the request between
    /// those two writes.
    ///
    /// # Errors
    ///
    /// * `RequestNotFound` - the id is unknown
    /// * `Conflict` - another transition committed first and the request
    ///   no longer holds `expected`
    pub fn apply_transition(
        &self,
        id: RequestId,
        expected: WithdrawalStatus,
        entry: HistoryEntry,
    ) -> Result<WithdrawalRequest, WithdrawalError> {
        let mut stored = self
            .requests
            .get_mut(&id)
            .ok_or_else(|| WithdrawalError::request_not_found(id))?;

        commit_transition(stored.value_mut(), expected, entry)?;
        Ok(stored.value().clone())
    }

    /// Snapshot all requests matching the filter, sorted by request id
    ///
    /// The result is a point-in-time snapshot; requests inserted or
    /// transitioned by other threads afterwards are not reflected.
    pub fn list(&self, filter: &RequestFilter) -> Vec<WithdrawalRequest> {
        let mut requests: Vec<WithdrawalRequest> = self
            .requests
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        requests.sort_by_key(|request| request.id);
        requests
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

// The storage abstraction is implemented by delegation so the read-only
// query surface works over either store implementation.
impl RequestStore for SharedRequestStore {
    fn insert(&mut self, request: WithdrawalRequest) -> Result<(), WithdrawalError> {
        SharedRequestStore::insert(self, request)
    }

    fn get(&self, id: RequestId) -> Option<WithdrawalRequest> {
        SharedRequestStore::get(self, id)
    }

    fn apply_transition(
        &mut self,
        id: RequestId,
        expected: WithdrawalStatus,
        entry: HistoryEntry,
    ) -> Result<WithdrawalRequest, WithdrawalError> {
        SharedRequestStore::apply_transition(self, id, expected, entry)
    }

    fn list(&self, filter: &RequestFilter) -> Vec<WithdrawalRequest> {
        SharedRequestStore::list(self, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewWithdrawal;
    use chrono::Utc;
    use std::sync::Arc;

    fn stored_request(id: RequestId, student: u32) -> WithdrawalRequest {
        WithdrawalRequest::open(
            NewWithdrawal {
                request: id,
                student,
                reporting_teacher: 7,
                guardian: 55,
                cause: "Medical appointment".to_string(),
                guardian_dni: None,
            },
            7,
            Utc::now(),
        )
    }

    fn entry(status: WithdrawalStatus, actor: u32) -> HistoryEntry {
        HistoryEntry {
            status,
            actor,
            at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let store = SharedRequestStore::new();

        store.insert(stored_request(1, 100)).unwrap();

        let retrieved = store.get(1).unwrap();
        assert_eq!(retrieved.id, 1);
        assert_eq!(retrieved.status, WithdrawalStatus::Pendiente);
        assert!(store.get(999).is_none());
    }

    #[test]
    fn test_insert_duplicate_rejected() {
        let store = SharedRequestStore::new();
        store.insert(stored_request(1, 100)).unwrap();

        let result = store.insert(stored_request(1, 200));
        assert!(matches!(
            result.unwrap_err(),
            WithdrawalError::DuplicateRequest { request: 1 }
        ));
        assert_eq!(store.get(1).unwrap().student, 100);
    }

    #[test]
    fn test_apply_transition_cas_semantics() {
        let store = SharedRequestStore::new();
        store.insert(stored_request(1, 100)).unwrap();

        let updated = store
            .apply_transition(
                1,
                WithdrawalStatus::Pendiente,
                entry(WithdrawalStatus::Autorizado, 42),
            )
            .unwrap();
        assert_eq!(updated.status, WithdrawalStatus::Autorizado);
        assert_eq!(updated.verified_by, Some(42));

        // A stale writer loses with a conflict, not an overwrite
        let result = store.apply_transition(
            1,
            WithdrawalStatus::Pendiente,
            entry(WithdrawalStatus::Rechazado, 9),
        );
        assert_eq!(
            result.unwrap_err(),
            WithdrawalError::conflict(
                1,
                WithdrawalStatus::Pendiente,
                WithdrawalStatus::Autorizado
            )
        );

        let request = store.get(1).unwrap();
        assert_eq!(request.history.len(), 2);
        assert_eq!(request.status, WithdrawalStatus::Autorizado);
    }

    #[test]
    fn test_concurrent_inserts_different_requests() {
        use std::thread;

        let store = Arc::new(SharedRequestStore::new());
        let mut handles = vec![];

        for i in 0..10 {
            let store_clone = Arc::clone(&store);
            let handle = thread::spawn(move || {
                store_clone.insert(stored_request(i, 100 + i)).unwrap();
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 10);
    }

    #[test]
    fn test_concurrent_inserts_same_request_exactly_one_wins() {
        use std::thread;

        let store = Arc::new(SharedRequestStore::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let store_clone = Arc::clone(&store);
            let handle =
                thread::spawn(move || store_clone.insert(stored_request(1, 100)).is_ok());
            handles.push(handle);
        }

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_concurrent_transitions_exactly_one_commits() {
        use std::thread;

        let store = Arc::new(SharedRequestStore::new());
        store.insert(stored_request(1, 100)).unwrap();

        let mut handles = vec![];
        for i in 0..8 {
            let store_clone = Arc::clone(&store);
            let handle = thread::spawn(move || {
                let target = if i % 2 == 0 {
                    WithdrawalStatus::Autorizado
                } else {
                    WithdrawalStatus::Rechazado
                };
                store_clone
                    .apply_transition(1, WithdrawalStatus::Pendiente, entry(target, 40 + i))
                    .is_ok()
            });
            handles.push(handle);
        }

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        // Exactly one transition wins; history grew by exactly one
        assert_eq!(successes, 1);
        let request = store.get(1).unwrap();
        assert_eq!(request.history.len(), 2);
        assert_eq!(request.status, request.history[1].status);
        assert!(request.status.is_terminal());
    }

    #[test]
    fn test_reads_never_observe_torn_state() {
        use std::thread;

        let store = Arc::new(SharedRequestStore::new());
        store.insert(stored_request(1, 100)).unwrap();

        let writer_store = Arc::clone(&store);
        let writer = thread::spawn(move || {
            writer_store
                .apply_transition(
                    1,
                    WithdrawalStatus::Pendiente,
                    entry(WithdrawalStatus::Autorizado, 42),
                )
                .unwrap();
        });

        // Concurrent readers see either pre- or post-transition state,
        // with status always matching the last history entry
        let mut readers = vec![];
        for _ in 0..8 {
            let reader_store = Arc::clone(&store);
            readers.push(thread::spawn(move || {
                let request = reader_store.get(1).unwrap();
                assert_eq!(request.status, request.history.last().unwrap().status);
                match request.status {
                    WithdrawalStatus::Pendiente => assert_eq!(request.history.len(), 1),
                    WithdrawalStatus::Autorizado => assert_eq!(request.history.len(), 2),
                    other => panic!("unexpected status {other}"),
                }
            }));
        }

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[test]
    fn test_list_snapshot_sorted() {
        let store = SharedRequestStore::new();
        store.insert(stored_request(3, 300)).unwrap();
        store.insert(stored_request(1, 100)).unwrap();
        store.insert(stored_request(2, 100)).unwrap();

        let all = store.list(&RequestFilter::default());
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        let student_100 = store.list(&RequestFilter {
            student: Some(100),
            ..Default::default()
        });
        assert_eq!(student_100.len(), 2);
    }
}
