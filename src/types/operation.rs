//! Operation types for the batch import surface
//!
//! This module defines the typed operation records produced from recorded
//! CSV rows. Each row becomes an explicit struct with typed fields; unknown
//! columns and dynamic payloads are rejected at the conversion boundary.

use super::request::{ActorId, GuardianId, RequestId, StudentId};
use super::status::WithdrawalStatus;
use serde::{Deserialize, Serialize};

/// Kinds of recorded operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Open a new withdrawal request in `PENDIENTE`
    ///
    /// Requires the student, reporting teacher, guardian, and cause fields.
    Create,

    /// Move an existing request to a target status
    ///
    /// Requires the target status field; the status code is resolved
    /// against the catalog before the operation reaches the engine.
    Transition,
}

/// A recorded operation against the withdrawal engine
///
/// Field presence depends on the operation kind: `Create` carries the
/// creation fields, `Transition` carries the resolved target status.
/// Conversion from CSV enforces the presence rules.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    /// The kind of operation (create or transition)
    pub kind: OperationKind,

    /// The withdrawal request this operation applies to
    pub request: RequestId,

    /// The student being withdrawn (create only)
    pub student: Option<StudentId>,

    /// The reporting teacher (create only)
    pub reporting_teacher: Option<ActorId>,

    /// The guardian expected at pickup (create only)
    pub guardian: Option<GuardianId>,

    /// Resolved target status (transition only)
    pub target: Option<WithdrawalStatus>,

    /// The actor performing the operation
    pub actor: ActorId,

    /// Free-text reason (create only)
    pub cause: Option<String>,

    /// Guardian DNI captured at creation (create only, optional)
    pub guardian_dni: Option<String>,
}
