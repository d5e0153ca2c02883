//! Withdrawal status types
//!
//! This module defines the status enumeration for withdrawal requests.
//! The set of valid statuses, their display names, and their presentation
//! order are owned by the status catalog in [`crate::core::catalog`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a withdrawal request
///
/// A request starts in `Pendiente` and moves to exactly one of the two
/// terminal states. Terminal states admit no further transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    /// Awaiting a decision
    ///
    /// Every request is created in this state by the reporting teacher.
    /// It is the only state transitions may leave from.
    Pendiente,

    /// Approved for pickup (terminal, confirmed)
    ///
    /// Entering this state records the deciding actor as the verifier
    /// of the guardian's identity.
    Autorizado,

    /// Denied (terminal)
    ///
    /// The request is kept for auditing; it is never deleted.
    Rechazado,
}

impl WithdrawalStatus {
    /// Whether this status admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WithdrawalStatus::Autorizado | WithdrawalStatus::Rechazado
        )
    }

    /// Canonical textual code for this status
    ///
    /// Codes are the uppercase forms used in reports and history paths.
    pub fn code(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pendiente => "PENDIENTE",
            WithdrawalStatus::Autorizado => "AUTORIZADO",
            WithdrawalStatus::Rechazado => "RECHAZADO",
        }
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
