//! Basic-salary audit trail.
//!
//! The employee write path calls [`record_salary_assignment`] on the same
//! transaction as the row write, so an employee row and its audit entries are
//! always committed or discarded together. Triggers in the schema reject any
//! update or delete of an audit row.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::EngineResult;
use crate::models::{Actor, AuditEntry, ChangeKind, EmployeeId};

use super::rows::AuditRow;

/// Decides which audit entry, if any, a salary write produces.
///
/// Creation always produces an entry. An update produces one only when the
/// salary actually changes.
fn change_kind(previous: Option<Decimal>, new: Decimal) -> Option<ChangeKind> {
    match previous {
        None => Some(ChangeKind::Create),
        Some(old) if old != new => Some(ChangeKind::Update),
        Some(_) => None,
    }
}

/// Records a basic-salary assignment for an employee.
///
/// `previous` is `None` when the employee is being created. Returns the
/// appended entry, or `None` for an update that left the salary unchanged.
pub(crate) async fn record_salary_assignment(
    conn: &mut SqliteConnection,
    employee_id: EmployeeId,
    previous: Option<Decimal>,
    new: Decimal,
    actor: &Actor,
) -> EngineResult<Option<AuditEntry>> {
    let Some(change_kind) = change_kind(previous, new) else {
        return Ok(None);
    };

    let row = sqlx::query_as::<_, AuditRow>(
        "INSERT INTO salary_audit_log \
         (employee_id, previous_salary, new_salary, changed_by, changed_at, change_kind) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(employee_id.to_sql())
    .bind(previous.map(|amount| amount.to_string()))
    .bind(new.to_string())
    .bind(actor.as_str())
    .bind(Utc::now())
    .bind(change_kind.as_sql())
    .fetch_one(conn)
    .await?;
    let entry = AuditEntry::try_from(row)?;

    debug!(
        audit_id = %entry.id,
        employee_id = %employee_id,
        change_kind = ?change_kind,
        actor = %actor,
        "Appended salary audit entry"
    );
    Ok(Some(entry))
}

/// Returns up to `limit` audit entries, newest first.
pub(crate) async fn recent_entries(
    conn: &mut SqliteConnection,
    limit: usize,
) -> EngineResult<Vec<AuditEntry>> {
    sqlx::query_as::<_, AuditRow>("SELECT * FROM salary_audit_log ORDER BY id DESC LIMIT ?")
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(conn)
        .await?
        .into_iter()
        .map(AuditEntry::try_from)
        .collect()
}

/// Returns every audit entry for one employee, newest first.
pub(crate) async fn entries_for_employee(
    conn: &mut SqliteConnection,
    employee_id: EmployeeId,
) -> EngineResult<Vec<AuditEntry>> {
    sqlx::query_as::<_, AuditRow>(
        "SELECT * FROM salary_audit_log WHERE employee_id = ? ORDER BY id DESC",
    )
    .bind(employee_id.to_sql())
    .fetch_all(conn)
    .await?
    .into_iter()
    .map(AuditEntry::try_from)
    .collect()
}
