//! CSV format handling for operation rows and request report output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvOperation structure for deserialization
//! - Conversion from CSV rows to typed operation records
//! - Request report serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::core::catalog::StatusCatalog;
use crate::types::{
    ActorId, GuardianId, OperationKind, OperationRecord, RequestId, StudentId, WithdrawalRequest,
};
use serde::Deserialize;
use std::io::Write;

/// CSV row structure for deserialization
///
/// Matches the recorded operations format with columns:
/// op, request, student, teacher, guardian, status, actor, cause, dni.
/// Most fields are optional because field presence depends on the
/// operation kind; presence rules are enforced during conversion.
/// Unknown columns are rejected.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CsvOperation {
    pub op: String,
    pub request: RequestId,
    pub student: Option<StudentId>,
    pub teacher: Option<ActorId>,
    pub guardian: Option<GuardianId>,
    pub status: Option<String>,
    pub actor: ActorId,
    pub cause: Option<String>,
    pub dni: Option<String>,
}

/// Convert a CsvOperation to a typed OperationRecord
///
/// This function:
/// - Parses the operation string into an OperationKind
/// - Resolves the target status code through the catalog (transitions)
/// - Validates that create rows carry student, teacher, guardian, cause
/// - Validates that transition rows carry a status code
///
/// # Arguments
///
/// * `row` - The deserialized CSV row
/// * `catalog` - The status catalog used to resolve status codes
///
/// # Returns
///
/// Result containing either:
/// - Ok(OperationRecord) - Successfully converted row
/// - Err(String) - Error message describing the conversion failure
pub fn convert_operation(
    row: CsvOperation,
    catalog: &StatusCatalog,
) -> Result<OperationRecord, String> {
    let kind = match row.op.to_lowercase().as_str() {
        "create" => OperationKind::Create,
        "transition" => OperationKind::Transition,
        _ => {
            return Err(format!(
                "Invalid operation '{}' for request {}",
                row.op, row.request
            ))
        }
    };

    let target = match kind {
        OperationKind::Create => None,
        OperationKind::Transition => {
            let code = match row.status.as_deref().map(str::trim) {
                Some(code) if !code.is_empty() => code,
                _ => {
                    return Err(format!(
                        "transition operation for request {} requires a status",
                        row.request
                    ))
                }
            };
            Some(
                catalog
                    .resolve(code)
                    .map_err(|e| format!("{} for request {}", e, row.request))?,
            )
        }
    };

    if kind == OperationKind::Create {
        let missing = |field: &str| {
            format!(
                "create operation for request {} requires field '{}'",
                row.request, field
            )
        };
        if row.student.is_none() {
            return Err(missing("student"));
        }
        if row.teacher.is_none() {
            return Err(missing("teacher"));
        }
        if row.guardian.is_none() {
            return Err(missing("guardian"));
        }
        if row.cause.as_deref().map(str::trim).unwrap_or("").is_empty() {
            return Err(missing("cause"));
        }
    }

    // Blank optional strings collapse to None
    let cause = row
        .cause
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    let guardian_dni = row
        .dni
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Ok(OperationRecord {
        kind,
        request: row.request,
        student: row.student,
        reporting_teacher: row.teacher,
        guardian: row.guardian,
        target,
        actor: row.actor,
        cause,
        guardian_dni,
    })
}

/// Write final request states to CSV format
///
/// Writes requests with columns: request, student, guardian, status,
/// verified_by, history. The history column is the ordered path of status
/// codes separated by `>`. Requests are sorted by id for deterministic
/// output.
///
/// # Arguments
///
/// * `requests` - Slice of request states to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_requests_csv(
    requests: &[WithdrawalRequest],
    output: &mut dyn Write,
) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    // Write header
    writer
        .write_record([
            "request",
            "student",
            "guardian",
            "status",
            "verified_by",
            "history",
        ])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    // Sort requests by id for deterministic output
    let mut sorted_requests = requests.to_vec();
    sorted_requests.sort_by_key(|request| request.id);

    // Write each request
    for request in sorted_requests {
        let history = request
            .history
            .iter()
            .map(|entry| entry.status.code())
            .collect::<Vec<_>>()
            .join(">");

        writer
            .write_record(&[
                request.id.to_string(),
                request.student.to_string(),
                request.guardian.to_string(),
                request.status.to_string(),
                request
                    .verified_by
                    .map(|actor| actor.to_string())
                    .unwrap_or_default(),
                history,
            ])
            .map_err(|e| format!("Failed to write request record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
