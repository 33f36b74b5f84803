//! Read-side report models.
//!
//! Payslips and department reports join salary records with employee and
//! department details. They hold no logic beyond totals and are rebuilt on
//! every request.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::round_money;
use crate::models::{Department, DepartmentId, Employee, EmployeeId, PayPeriod, SalaryPeriodRecord};

/// A single employee's salary record with display details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    /// The employee.
    pub employee_id: EmployeeId,
    /// The employee's name.
    pub employee_name: String,
    /// The employee's designation.
    pub designation: String,
    /// The employee's department name.
    pub department_name: String,
    /// The period covered.
    pub period: PayPeriod,
    /// The salary record.
    pub record: SalaryPeriodRecord,
}

impl Payslip {
    /// Joins a period's record with its employee and department.
    pub fn new(
        employee: &Employee,
        department: &Department,
        period: PayPeriod,
        record: SalaryPeriodRecord,
    ) -> Self {
        Self {
            employee_id: employee.id,
            employee_name: employee.name.clone(),
            designation: employee.designation.clone(),
            department_name: department.name.clone(),
            period,
            record,
        }
    }
}

/// One employee's line in a department report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentReportLine {
    /// The employee.
    pub employee_id: EmployeeId,
    /// The employee's name.
    pub employee_name: String,
    /// The employee's designation.
    pub designation: String,
    /// Gross salary for the period.
    pub gross_salary: Decimal,
    /// Tax for the period.
    pub tax: Decimal,
    /// Net salary for the period.
    pub net_salary: Decimal,
}

impl DepartmentReportLine {
    /// Builds a line from an employee and their record.
    pub fn new(employee: &Employee, record: &SalaryPeriodRecord) -> Self {
        Self {
            employee_id: employee.id,
            employee_name: employee.name.clone(),
            designation: employee.designation.clone(),
            gross_salary: record.gross_salary,
            tax: record.tax,
            net_salary: record.net_salary,
        }
    }
}

/// Salary records of one department for one period, with totals.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{Department, DepartmentId, PayPeriod};
/// use payroll_engine::reports::DepartmentReport;
/// use rust_decimal::Decimal;
///
/// let department = Department {
///     id: DepartmentId(1),
///     name: "Engineering".to_string(),
///     location: "Pune".to_string(),
///     manager_id: None,
/// };
/// let report = DepartmentReport::new(&department, PayPeriod::new(1, 2024).unwrap(), vec![]);
/// assert_eq!(report.employee_count, 0);
/// assert_eq!(report.average_net, Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentReport {
    /// The department.
    pub department_id: DepartmentId,
    /// The department name.
    pub department_name: String,
    /// The department location.
    pub location: String,
    /// The period covered.
    pub period: PayPeriod,
    /// One line per employee with a record, ordered by name then id.
    pub lines: Vec<DepartmentReportLine>,
    /// Number of lines.
    pub employee_count: usize,
    /// Sum of gross salaries.
    pub total_gross: Decimal,
    /// Sum of tax.
    pub total_tax: Decimal,
    /// Sum of net salaries.
    pub total_net: Decimal,
    /// Mean net salary, zero for an empty report.
    pub average_net: Decimal,
}

impl DepartmentReport {
    /// Orders the lines and computes the totals.
    pub fn new(
        department: &Department,
        period: PayPeriod,
        mut lines: Vec<DepartmentReportLine>,
    ) -> Self {
        lines.sort_by(|a, b| {
            a.employee_name
                .cmp(&b.employee_name)
                .then(a.employee_id.cmp(&b.employee_id))
        });

        let employee_count = lines.len();
        let total_gross: Decimal = lines.iter().map(|line| line.gross_salary).sum();
        let total_tax: Decimal = lines.iter().map(|line| line.tax).sum();
        let total_net: Decimal = lines.iter().map(|line| line.net_salary).sum();
        let average_net = if employee_count == 0 {
            Decimal::ZERO
        } else {
            round_money(total_net / Decimal::from(employee_count))
        };

        Self {
            department_id: department.id,
            department_name: department.name.clone(),
            location: department.location.clone(),
            period,
            lines,
            employee_count,
            total_gross,
            total_tax,
            total_net,
            average_net,
        }
    }
}
