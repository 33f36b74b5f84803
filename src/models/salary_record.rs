//! Salary period record model.
//!
//! A [`SalaryPeriodRecord`] is the computed payroll line for one employee in one
//! calendar month. The store writes its derived amounts together from a
//! [`SalaryBreakdown`](crate::calculation::SalaryBreakdown) and checks them again
//! when reading a row back, so gross and net never drift from their components.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{EmployeeId, SalaryRecordId};

/// The payroll line for one (employee, month, year).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryPeriodRecord {
    /// Identity of the record, stable across recomputation.
    pub id: SalaryRecordId,
    /// The employee this record belongs to.
    pub employee_id: EmployeeId,
    /// The month of the period, 1 to 12.
    pub month: u32,
    /// The year of the period.
    pub year: i32,
    /// Basic salary at the time of computation.
    pub basic_salary: Decimal,
    /// House rent allowance.
    pub hra: Decimal,
    /// Bonus.
    pub bonus: Decimal,
    /// Basic + HRA + bonus.
    pub gross_salary: Decimal,
    /// Monthly tax withheld.
    pub tax: Decimal,
    /// Gross minus tax.
    pub net_salary: Decimal,
    /// When the amounts were last computed.
    pub computed_at: DateTime<Utc>,
}
