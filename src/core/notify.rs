//! Transition notifications
//!
//! After a transition commits, the engine informs a notification emitter
//! so guardians and staff can be told about the status change. Delivery is
//! fire-and-forget: an emitter failure is logged and never rolls back or
//! fails the transition that triggered it.
//!
//! The production delivery channel lives outside this crate; the default
//! emitter here only writes a structured log line.

use crate::types::{ActorId, RequestId, WithdrawalStatus};
use std::fmt;

/// Payload describing one committed status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionNotice {
    /// The request that changed
    pub request: RequestId,

    /// The status that was entered
    pub status: WithdrawalStatus,

    /// The actor that triggered the change
    pub actor: ActorId,
}

/// Error raised by a notification emitter
///
/// Only ever logged; emitter errors never propagate to the caller of the
/// transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitError {
    /// Description of the delivery failure
    pub message: String,
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notification failed: {}", self.message)
    }
}

impl std::error::Error for EmitError {}

/// Receiver of committed status changes
pub trait NotificationEmitter: Send + Sync {
    /// Deliver a notice about one committed status change
    fn notify(&self, notice: &TransitionNotice) -> Result<(), EmitError>;
}

/// Emitter that records notices as log lines
///
/// Stands in for the real delivery channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmitter;

impl NotificationEmitter for LogEmitter {
    fn notify(&self, notice: &TransitionNotice) -> Result<(), EmitError> {
        tracing::info!(
            request = notice.request,
            status = %notice.status,
            actor = notice.actor,
            "withdrawal status changed"
        );
        Ok(())
    }
}
