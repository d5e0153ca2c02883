//! Read-only query surface
//!
//! Pure read projections over a request store: list/filter by student,
//! status, or creation date range, and fetch a single request with its
//! full ordered history. No business logic lives here, and every result
//! is an owned defensive copy - callers cannot mutate stored history
//! through the read path.

use crate::core::traits::RequestStore;
use crate::types::{
    RequestFilter, RequestId, StudentId, WithdrawalError, WithdrawalRequest, WithdrawalStatus,
};
use chrono::{DateTime, Utc};

/// Read-only view over a request store
pub struct RequestQuery<'a, S: RequestStore> {
    store: &'a S,
}

impl<'a, S: RequestStore> RequestQuery<'a, S> {
    /// Create a query surface over the given store
    pub fn new(store: &'a S) -> Self {
        RequestQuery { store }
    }

    /// Fetch a request with its full ordered history
    ///
    /// # Errors
    ///
    /// Returns `RequestNotFound` for unknown ids.
    pub fn fetch(&self, id: RequestId) -> Result<WithdrawalRequest, WithdrawalError> {
        self.store
            .get(id)
            .ok_or_else(|| WithdrawalError::request_not_found(id))
    }

    /// List requests matching the filter, sorted by request id
    pub fn list(&self, filter: &RequestFilter) -> Vec<WithdrawalRequest> {
        self.store.list(filter)
    }

    /// All requests for one student
    pub fn by_student(&self, student: StudentId) -> Vec<WithdrawalRequest> {
        self.list(&RequestFilter {
            student: Some(student),
            ..Default::default()
        })
    }

    /// All requests currently in one status
    pub fn by_status(&self, status: WithdrawalStatus) -> Vec<WithdrawalRequest> {
        self.list(&RequestFilter {
            status: Some(status),
            ..Default::default()
        })
    }

    /// All requests created within the inclusive range
    pub fn created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<WithdrawalRequest> {
        self.list(&RequestFilter {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        })
    }
}
