//! Table rows and their conversion into models.
//!
//! Amounts are stored as decimal text. Converting a row checks what the
//! schema cannot: amounts parse, periods are valid and derived salary amounts
//! add up. A row that fails these checks is reported, never returned.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Actor, AuditEntry, AuditEntryId, ChangeKind, Department, DepartmentId, Employee, EmployeeId,
    PayPeriod, SalaryPeriodRecord, SalaryRecordId,
};

#[derive(Debug, FromRow)]
pub(super) struct DepartmentRow {
    id: i64,
    name: String,
    location: String,
    manager_id: Option<i64>,
}

impl From<DepartmentRow> for Department {
    fn from(row: DepartmentRow) -> Self {
        Department {
            id: DepartmentId::from_sql(row.id),
            name: row.name,
            location: row.location,
            manager_id: row.manager_id.map(EmployeeId::from_sql),
        }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct EmployeeRow {
    id: i64,
    name: String,
    email: String,
    phone: String,
    hire_date: NaiveDate,
    department_id: i64,
    designation: String,
    basic_salary: String,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = EngineError;

    fn try_from(row: EmployeeRow) -> EngineResult<Self> {
        let basic_salary = parse_amount("employees", row.id, "basic_salary", &row.basic_salary)?;
        Ok(Employee {
            id: EmployeeId::from_sql(row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            hire_date: row.hire_date,
            department_id: DepartmentId::from_sql(row.department_id),
            designation: row.designation,
            basic_salary,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct SalaryRecordRow {
    id: i64,
    employee_id: i64,
    month: i64,
    year: i64,
    basic_salary: String,
    hra: String,
    bonus: String,
    gross_salary: String,
    tax: String,
    net_salary: String,
    computed_at: DateTime<Utc>,
}

impl TryFrom<SalaryRecordRow> for SalaryPeriodRecord {
    type Error = EngineError;

    fn try_from(row: SalaryRecordRow) -> EngineResult<Self> {
        let amount =
            |column: &str, text: &str| parse_amount("salary_records", row.id, column, text);

        let period = u32::try_from(row.month)
            .ok()
            .zip(i32::try_from(row.year).ok())
            .and_then(|(month, year)| PayPeriod::new(month, year).ok())
            .ok_or_else(|| EngineError::ConstraintViolation {
                message: format!(
                    "salary record {} has invalid period {}/{}",
                    row.id, row.month, row.year
                ),
            })?;

        let record = SalaryPeriodRecord {
            id: SalaryRecordId::from_sql(row.id),
            employee_id: EmployeeId::from_sql(row.employee_id),
            month: period.month(),
            year: period.year(),
            basic_salary: amount("basic_salary", &row.basic_salary)?,
            hra: amount("hra", &row.hra)?,
            bonus: amount("bonus", &row.bonus)?,
            gross_salary: amount("gross_salary", &row.gross_salary)?,
            tax: amount("tax", &row.tax)?,
            net_salary: amount("net_salary", &row.net_salary)?,
            computed_at: row.computed_at,
        };
        check_record_arithmetic(&record)?;
        Ok(record)
    }
}

/// Gross is the sum of its components and net is gross minus tax.
fn check_record_arithmetic(record: &SalaryPeriodRecord) -> EngineResult<()> {
    let gross = record
        .basic_salary
        .checked_add(record.hra)
        .and_then(|sum| sum.checked_add(record.bonus));
    if gross != Some(record.gross_salary) {
        return Err(EngineError::ConstraintViolation {
            message: format!(
                "salary record {}: gross {} is not basic + hra + bonus",
                record.id, record.gross_salary
            ),
        });
    }
    if record.gross_salary.checked_sub(record.tax) != Some(record.net_salary) {
        return Err(EngineError::ConstraintViolation {
            message: format!(
                "salary record {}: net {} is not gross - tax",
                record.id, record.net_salary
            ),
        });
    }
    Ok(())
}

#[derive(Debug, FromRow)]
pub(super) struct AuditRow {
    id: i64,
    employee_id: i64,
    previous_salary: Option<String>,
    new_salary: String,
    changed_by: String,
    changed_at: DateTime<Utc>,
    change_kind: String,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = EngineError;

    fn try_from(row: AuditRow) -> EngineResult<Self> {
        let change_kind = ChangeKind::from_sql(&row.change_kind).ok_or_else(|| {
            EngineError::ConstraintViolation {
                message: format!(
                    "audit entry {} has unknown change kind '{}'",
                    row.id, row.change_kind
                ),
            }
        })?;
        let previous_salary = row
            .previous_salary
            .as_deref()
            .map(|text| parse_amount("salary_audit_log", row.id, "previous_salary", text))
            .transpose()?;

        Ok(AuditEntry {
            id: AuditEntryId::from_sql(row.id),
            employee_id: EmployeeId::from_sql(row.employee_id),
            previous_salary,
            new_salary: parse_amount("salary_audit_log", row.id, "new_salary", &row.new_salary)?,
            changed_by: Actor::new(row.changed_by),
            changed_at: row.changed_at,
            change_kind,
        })
    }
}

fn parse_amount(table: &str, id: i64, column: &str, text: &str) -> EngineResult<Decimal> {
    Decimal::from_str(text).map_err(|e| EngineError::StoreError {
        message: format!("{}.{} of row {} is not a decimal ('{}'): {}", table, column, id, text, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_row(month: i64, gross: &str, net: &str) -> SalaryRecordRow {
        SalaryRecordRow {
            id: 1,
            employee_id: 1,
            month,
            year: 2024,
            basic_salary: "30000".to_string(),
            hra: "12000.00".to_string(),
            bonus: "3000.00".to_string(),
            gross_salary: gross.to_string(),
            tax: "458.33".to_string(),
            net_salary: net.to_string(),
            computed_at: Utc::now(),
        }
    }

    #[test]
    fn test_consistent_record_row_converts() {
        let record = SalaryPeriodRecord::try_from(record_row(1, "45000.00", "44541.67")).unwrap();
        assert_eq!(record.month, 1);
        assert_eq!(record.net_salary, Decimal::new(4454167, 2));
    }

    #[test]
    fn test_record_row_with_invalid_month_is_rejected() {
        let result = SalaryPeriodRecord::try_from(record_row(13, "45000.00", "44541.67"));
        assert!(matches!(result, Err(EngineError::ConstraintViolation { .. })));
    }

    #[test]
    fn test_record_row_with_inconsistent_amounts_is_rejected() {
        let gross_off = SalaryPeriodRecord::try_from(record_row(1, "45000.01", "44541.68"));
        assert!(matches!(gross_off, Err(EngineError::ConstraintViolation { .. })));

        let net_off = SalaryPeriodRecord::try_from(record_row(1, "45000.00", "45000.00"));
        assert!(matches!(net_off, Err(EngineError::ConstraintViolation { .. })));
    }

    #[test]
    fn test_unparseable_amount_is_store_error() {
        let mut row = record_row(1, "45000.00", "44541.67");
        row.hra = "twelve thousand".to_string();
        assert!(matches!(
            SalaryPeriodRecord::try_from(row),
            Err(EngineError::StoreError { .. })
        ));
    }

    #[test]
    fn test_audit_row_with_unknown_kind_is_rejected() {
        let row = AuditRow {
            id: 3,
            employee_id: 1,
            previous_salary: None,
            new_salary: "100".to_string(),
            changed_by: "hr".to_string(),
            changed_at: Utc::now(),
            change_kind: "DELETE".to_string(),
        };
        assert!(matches!(
            AuditEntry::try_from(row),
            Err(EngineError::ConstraintViolation { .. })
        ));
    }
}
