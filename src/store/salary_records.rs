//! Salary period record table operations.
//!
//! Records are keyed by (employee, month, year) under a UNIQUE constraint.
//! Writes go through an `ON CONFLICT` upsert, so a second record for the same
//! key cannot be created and a recomputation keeps the record's id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use crate::calculation::SalaryBreakdown;
use crate::error::EngineResult;
use crate::models::{DepartmentId, EmployeeId, PayPeriod, SalaryPeriodRecord};

use super::rows::SalaryRecordRow;

/// Whether an upsert created a record or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    /// A new record was inserted.
    Inserted,
    /// An existing record's amounts were replaced.
    Updated,
}

/// Finds the record for an employee and period.
pub(crate) async fn find_salary_record(
    conn: &mut SqliteConnection,
    employee_id: EmployeeId,
    period: PayPeriod,
) -> EngineResult<Option<SalaryPeriodRecord>> {
    sqlx::query_as::<_, SalaryRecordRow>(
        "SELECT * FROM salary_records WHERE employee_id = ? AND month = ? AND year = ?",
    )
    .bind(employee_id.to_sql())
    .bind(period.month())
    .bind(period.year())
    .fetch_optional(conn)
    .await?
    .map(SalaryPeriodRecord::try_from)
    .transpose()
}

/// Inserts or overwrites the record for an employee and period.
///
/// An existing record keeps its id; its amounts and timestamp are replaced.
/// Must run inside a write transaction so the reported outcome matches the
/// write.
pub(crate) async fn upsert_salary_record(
    conn: &mut SqliteConnection,
    employee_id: EmployeeId,
    period: PayPeriod,
    breakdown: &SalaryBreakdown,
    computed_at: DateTime<Utc>,
) -> EngineResult<(SalaryPeriodRecord, UpsertOutcome)> {
    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM salary_records WHERE employee_id = ? AND month = ? AND year = ?",
    )
    .bind(employee_id.to_sql())
    .bind(period.month())
    .bind(period.year())
    .fetch_optional(&mut *conn)
    .await?;
    let outcome = match existing {
        Some(_) => UpsertOutcome::Updated,
        None => UpsertOutcome::Inserted,
    };

    let row = sqlx::query_as::<_, SalaryRecordRow>(
        "INSERT INTO salary_records \
         (employee_id, month, year, basic_salary, hra, bonus, gross_salary, tax, net_salary, computed_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT (employee_id, month, year) DO UPDATE SET \
             basic_salary = excluded.basic_salary, \
             hra = excluded.hra, \
             bonus = excluded.bonus, \
             gross_salary = excluded.gross_salary, \
             tax = excluded.tax, \
             net_salary = excluded.net_salary, \
             computed_at = excluded.computed_at \
         RETURNING *",
    )
    .bind(employee_id.to_sql())
    .bind(period.month())
    .bind(period.year())
    .bind(breakdown.basic().to_string())
    .bind(breakdown.hra().to_string())
    .bind(breakdown.bonus().to_string())
    .bind(breakdown.gross().to_string())
    .bind(breakdown.tax().to_string())
    .bind(breakdown.net().to_string())
    .bind(computed_at)
    .fetch_one(conn)
    .await?;

    Ok((SalaryPeriodRecord::try_from(row)?, outcome))
}

/// Returns all records for a period ordered by employee id.
pub(crate) async fn salary_records_for_period(
    conn: &mut SqliteConnection,
    period: PayPeriod,
) -> EngineResult<Vec<SalaryPeriodRecord>> {
    sqlx::query_as::<_, SalaryRecordRow>(
        "SELECT * FROM salary_records WHERE year = ? AND month = ? ORDER BY employee_id",
    )
    .bind(period.year())
    .bind(period.month())
    .fetch_all(conn)
    .await?
    .into_iter()
    .map(SalaryPeriodRecord::try_from)
    .collect()
}

/// Returns all records for an employee, most recent period first.
pub(crate) async fn salary_records_for_employee(
    conn: &mut SqliteConnection,
    employee_id: EmployeeId,
) -> EngineResult<Vec<SalaryPeriodRecord>> {
    sqlx::query_as::<_, SalaryRecordRow>(
        "SELECT * FROM salary_records WHERE employee_id = ? ORDER BY year DESC, month DESC",
    )
    .bind(employee_id.to_sql())
    .fetch_all(conn)
    .await?
    .into_iter()
    .map(SalaryPeriodRecord::try_from)
    .collect()
}

/// Returns the period's records of one department's employees, by employee id.
pub(crate) async fn salary_records_for_department(
    conn: &mut SqliteConnection,
    department_id: DepartmentId,
    period: PayPeriod,
) -> EngineResult<Vec<SalaryPeriodRecord>> {
    sqlx::query_as::<_, SalaryRecordRow>(
        "SELECT r.* FROM salary_records r \
         JOIN employees e ON e.id = r.employee_id \
         WHERE e.department_id = ? AND r.year = ? AND r.month = ? \
         ORDER BY r.employee_id",
    )
    .bind(department_id.to_sql())
    .bind(period.year())
    .bind(period.month())
    .fetch_all(conn)
    .await?
    .into_iter()
    .map(SalaryPeriodRecord::try_from)
    .collect()
}
