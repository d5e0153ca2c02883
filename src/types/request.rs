//! Withdrawal request types
//!
//! This module defines the withdrawal request entity, its append-only
//! audit history, and the filter vocabulary of the read-only query surface.

use super::status::WithdrawalStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Withdrawal request identifier
///
/// Supports request IDs from 0 to 4,294,967,295
pub type RequestId = u32;

/// Student identifier
pub type StudentId = u32;

/// Guardian (apoderado) identifier
pub type GuardianId = u32;

/// Staff member identifier (teachers, inspectors, administrators)
pub type ActorId = u32;

/// One entry of a request's audit history
///
/// Entries are append-only: they are written once when a status is entered
/// and never edited, removed, or reordered afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The status that was entered
    pub status: WithdrawalStatus,

    /// The actor that triggered the status change
    pub actor: ActorId,

    /// When the status was entered
    ///
    /// Entries within one request are ordered by this field ascending.
    pub at: DateTime<Utc>,
}

/// A request to release a student early, requiring guardian verification
///
/// The request's `status` always equals the status of its most recent
/// history entry. Requests are never deleted; terminal states end the
/// lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    /// Unique identifier, assigned at creation and immutable afterwards
    pub id: RequestId,

    /// The student being withdrawn (non-owning reference)
    pub student: StudentId,

    /// The teacher who reported the withdrawal (non-owning reference)
    pub reporting_teacher: ActorId,

    /// The guardian expected at pickup (non-owning reference)
    pub guardian: GuardianId,

    /// Free-text reason for the withdrawal
    pub cause: String,

    /// Current lifecycle status
    pub status: WithdrawalStatus,

    /// Guardian DNI captured at creation for verification at pickup
    pub guardian_dni: Option<String>,

    /// The staff member who confirmed the guardian's identity
    ///
    /// Set exactly when the request reaches `AUTORIZADO`; `None` otherwise.
    pub verified_by: Option<ActorId>,

    /// When the request was created; set once
    pub created_at: DateTime<Utc>,

    /// Append-only audit history, oldest entry first
    ///
    /// Non-empty from the moment of creation: creating a request writes
    /// the initial `PENDIENTE` entry.
    pub history: Vec<HistoryEntry>,
}

impl WithdrawalRequest {
    /// Create a new request in `PENDIENTE` with its initial history entry
    ///
    /// # Arguments
    ///
    /// * `new` - The creation fields (id, references, cause, optional DNI)
    /// * `actor` - The actor creating the request
    /// * `at` - Creation timestamp, recorded on the request and its first
    ///   history entry
    pub fn open(new: NewWithdrawal, actor: ActorId, at: DateTime<Utc>) -> Self {
        WithdrawalRequest {
            id: new.request,
            student: new.student,
            reporting_teacher: new.reporting_teacher,
            guardian: new.guardian,
            cause: new.cause,
            status: WithdrawalStatus::Pendiente,
            guardian_dni: new.guardian_dni,
            verified_by: None,
            created_at: at,
            history: vec![HistoryEntry {
                status: WithdrawalStatus::Pendiente,
                actor,
                at,
            }],
        }
    }

    /// The most recent history entry, if any
    ///
    /// Present on every request produced through the engine: history is
    /// non-empty from creation onwards.
    pub fn last_entry(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }
}

/// Creation fields for a withdrawal request
///
/// The typed request payload of the `create` operation. The request id is
/// supplied by the caller (the recording surface assigns ids); uniqueness
/// is enforced by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWithdrawal {
    /// Identifier for the new request
    pub request: RequestId,

    /// The student being withdrawn
    pub student: StudentId,

    /// The teacher reporting the withdrawal
    pub reporting_teacher: ActorId,

    /// The guardian expected at pickup
    pub guardian: GuardianId,

    /// Free-text reason
    pub cause: String,

    /// Guardian DNI, when captured up front
    pub guardian_dni: Option<String>,
}

/// Filter vocabulary of the query surface
///
/// All fields are optional; an empty filter matches every request.
/// The date bounds are inclusive and apply to `created_at`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestFilter {
    /// Match only requests for this student
    pub student: Option<StudentId>,

    /// Match only requests currently in this status
    pub status: Option<WithdrawalStatus>,

    /// Match only requests created at or after this instant
    pub from: Option<DateTime<Utc>>,

    /// Match only requests created at or before this instant
    pub to: Option<DateTime<Utc>>,
}

impl RequestFilter {
    /// Whether the given request satisfies every set criterion
    pub fn matches(&self, request: &WithdrawalRequest) -> bool {
        if let Some(student) = self.student {
            if request.student != student {
                return false;
            }
        }
        if let Some(status) = self.status {
            if request.status != status {
                return false;
            }
        }
        if let Some(from) = self.from {
            if request.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if request.created_at > to {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> WithdrawalRequest {
        WithdrawalRequest::open(
            NewWithdrawal {
                request: 1,
                student: 100,
                reporting_teacher: 7,
                guardian: 55,
                cause: "Medical appointment".to_string(),
                guardian_dni: Some("12345678-9".to_string()),
            },
            7,
            Utc::now(),
        )
    }

    #[test]
    fn test_open_starts_pending_with_initial_history() {
        let request = sample_request();

        assert_eq!(request.status, WithdrawalStatus::Pendiente);
        assert_eq!(request.history.len(), 1);

        let entry = request.last_entry().unwrap();
        assert_eq!(entry.status, WithdrawalStatus::Pendiente);
        assert_eq!(entry.actor, 7);
        assert_eq!(entry.at, request.created_at);
        assert!(request.verified_by.is_none());
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let request = sample_request();
        assert!(RequestFilter::default().matches(&request));
    }

    #[test]
    fn test_filter_by_student() {
        let request = sample_request();

        let matching = RequestFilter {
            student: Some(100),
            ..Default::default()
        };
        let other = RequestFilter {
            student: Some(101),
            ..Default::default()
        };

        assert!(matching.matches(&request));
        assert!(!other.matches(&request));
    }

    #[test]
    fn test_filter_by_status() {
        let request = sample_request();

        let pending = RequestFilter {
            status: Some(WithdrawalStatus::Pendiente),
            ..Default::default()
        };
        let authorized = RequestFilter {
            status: Some(WithdrawalStatus::Autorizado),
            ..Default::default()
        };

        assert!(pending.matches(&request));
        assert!(!authorized.matches(&request));
    }

    #[test]
    fn test_filter_by_date_range() {
        let request = sample_request();
        let created = request.created_at;

        let inside = RequestFilter {
            from: Some(created - chrono::Duration::minutes(1)),
            to: Some(created + chrono::Duration::minutes(1)),
            ..Default::default()
        };
        let before = RequestFilter {
            to: Some(created - chrono::Duration::minutes(1)),
            ..Default::default()
        };
        let after = RequestFilter {
            from: Some(created + chrono::Duration::minutes(1)),
            ..Default::default()
        };
        let boundary = RequestFilter {
            from: Some(created),
            to: Some(created),
            ..Default::default()
        };

        assert!(inside.matches(&request));
        assert!(!before.matches(&request));
        assert!(!after.matches(&request));
        assert!(boundary.matches(&request));
    }
}
