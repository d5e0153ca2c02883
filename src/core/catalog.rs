//! Status catalog
//!
//! Single source of truth for the valid withdrawal statuses, their display
//! names, and their presentation order. The catalog is seeded once at
//! construction and never mutated afterwards; every textual status code in
//! the system must resolve through it.
//!
//! Codes outside the catalog are rejected. This includes the retired
//! legacy code `COMPLETADO`, which is treated like any other unknown code
//! so that no new record can ever reference it.

use crate::types::{WithdrawalError, WithdrawalStatus};

/// One catalog row: a status with its presentation attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEntry {
    /// The status this entry describes
    pub status: WithdrawalStatus,

    /// Human-readable name shown in listings
    pub display_name: &'static str,

    /// Position in presentation order (ascending)
    pub order: u8,
}

/// Immutable catalog of valid withdrawal statuses
///
/// Constructed fully seeded; exposes only read operations. Callers resolve
/// textual codes through [`StatusCatalog::resolve`], which is the
/// data-integrity boundary rejecting codes outside the catalog.
#[derive(Debug, Clone)]
pub struct StatusCatalog {
    /// Catalog rows in presentation order
    entries: Vec<StatusEntry>,
}

impl StatusCatalog {
    /// Create the catalog seeded with the current status set
    pub fn new() -> Self {
        StatusCatalog {
            entries: vec![
                StatusEntry {
                    status: WithdrawalStatus::Pendiente,
                    display_name: "Pendiente",
                    order: 1,
                },
                StatusEntry {
                    status: WithdrawalStatus::Autorizado,
                    display_name: "Autorizado",
                    order: 2,
                },
                StatusEntry {
                    status: WithdrawalStatus::Rechazado,
                    display_name: "Rechazado",
                    order: 3,
                },
            ],
        }
    }

    /// All catalog entries in presentation order
    pub fn statuses(&self) -> &[StatusEntry] {
        &self.entries
    }

    /// Whether the given status is a catalog member
    pub fn contains(&self, status: WithdrawalStatus) -> bool {
        self.entries.iter().any(|entry| entry.status == status)
    }

    /// Resolve a textual status code to a catalog member
    ///
    /// Matching is case-insensitive against the canonical codes.
    ///
    /// # Errors
    ///
    /// Returns `UnknownStatus` for any code not present in the catalog,
    /// including retired legacy codes.
    pub fn resolve(&self, code: &str) -> Result<WithdrawalStatus, WithdrawalError> {
        let normalized = code.trim().to_uppercase();
        self.entries
            .iter()
            .find(|entry| entry.status.code() == normalized)
            .map(|entry| entry.status)
            .ok_or_else(|| WithdrawalError::unknown_status(code.trim()))
    }
}

impl Default for StatusCatalog {
    fn default() -> Self {
        Self::new()
    }
}
