//! Payroll runs and period records.
//!
//! [`PayrollLedger`] computes salary records from employees' current basic
//! salaries and upserts them into the store, one record per employee and
//! period. Re-running a period overwrites the existing record in place.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::info;

use crate::calculation::SalaryComputer;
use crate::error::{EngineError, EngineResult};
use crate::models::{DepartmentId, EmployeeId, PayPeriod, SalaryPeriodRecord};
use crate::reports::{DepartmentReport, DepartmentReportLine, Payslip};
use crate::store::{self, Database, UpsertOutcome, rolled_back};

/// Runs payroll against a [`Database`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use payroll_engine::calculation::SalaryComputer;
/// use payroll_engine::ledger::PayrollLedger;
/// use payroll_engine::models::EmployeeId;
/// use payroll_engine::store::Database;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let db = Database::in_memory().await?;
/// let ledger = PayrollLedger::new(Arc::new(db), SalaryComputer::default());
/// assert!(ledger.run_payroll(EmployeeId(1), 1, 2024).await.is_err());
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// # }).unwrap();
/// ```
#[derive(Clone)]
pub struct PayrollLedger {
    db: Arc<Database>,
    computer: SalaryComputer,
}

impl PayrollLedger {
    /// Creates a ledger over a store using the given computer.
    pub fn new(db: Arc<Database>, computer: SalaryComputer) -> Self {
        Self { db, computer }
    }

    /// Returns the underlying store.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Returns the salary computer.
    pub fn computer(&self) -> &SalaryComputer {
        &self.computer
    }

    /// Computes one employee's current salary into the store.
    async fn run_in(
        &self,
        conn: &mut SqliteConnection,
        employee_id: EmployeeId,
        period: PayPeriod,
    ) -> EngineResult<(SalaryPeriodRecord, UpsertOutcome)> {
        let basic_salary = store::find_employee(&mut *conn, employee_id)
            .await?
            .basic_salary;
        let breakdown = self.computer.compute(basic_salary)?;
        store::upsert_salary_record(conn, employee_id, period, &breakdown, Utc::now()).await
    }

    /// Runs payroll for one employee and period.
    ///
    /// The employee's basic salary is read at run time. If a record for the
    /// period exists its amounts are overwritten, keeping its id; otherwise a
    /// new record is inserted. No audit entry is produced.
    ///
    /// # Returns
    ///
    /// Returns the stored record, or an error if:
    /// - The month is outside 1..=12 or the year is not positive (`InvalidPeriod`)
    /// - The employee does not exist (`EmployeeNotFound`); nothing is written
    /// - A derived amount does not fit in a `Decimal` (`AmountOutOfRange`); nothing is written
    pub async fn run_payroll(
        &self,
        employee_id: EmployeeId,
        month: u32,
        year: i32,
    ) -> EngineResult<SalaryPeriodRecord> {
        let period = PayPeriod::new(month, year)?;
        let mut tx = self.db.begin_write().await?;
        let (record, outcome) = match self.run_in(tx.conn(), employee_id, period).await {
            Ok(result) => result,
            Err(err) => return Err(rolled_back("run_payroll", err)),
        };
        tx.commit().await?;

        info!(
            employee_id = %employee_id,
            period = %period,
            record_id = %record.id,
            outcome = ?outcome,
            net_salary = %record.net_salary,
            "Payroll run completed"
        );
        Ok(record)
    }

    /// Runs payroll for every employee in one transaction.
    ///
    /// Either every employee's record is written or none is. Returns the
    /// records ordered by employee id.
    pub async fn run_payroll_for_period(
        &self,
        month: u32,
        year: i32,
    ) -> EngineResult<Vec<SalaryPeriodRecord>> {
        let period = PayPeriod::new(month, year)?;
        let mut tx = self.db.begin_write().await?;
        let mut records = Vec::new();
        for employee in store::list_employees(tx.conn()).await? {
            match self.run_in(tx.conn(), employee.id, period).await {
                Ok((record, _)) => records.push(record),
                Err(err) => return Err(rolled_back("run_payroll_for_period", err)),
            }
        }
        tx.commit().await?;

        info!(
            period = %period,
            employees = records.len(),
            "Period payroll run completed"
        );
        Ok(records)
    }

    /// Returns all records of a period ordered by employee id.
    pub async fn records_for_period(
        &self,
        month: u32,
        year: i32,
    ) -> EngineResult<Vec<SalaryPeriodRecord>> {
        let period = PayPeriod::new(month, year)?;
        let mut tx = self.db.begin_read().await?;
        store::salary_records_for_period(&mut tx, period).await
    }

    /// Returns an employee's records, most recent period first.
    pub async fn records_for_employee(
        &self,
        employee_id: EmployeeId,
    ) -> EngineResult<Vec<SalaryPeriodRecord>> {
        let mut tx = self.db.begin_read().await?;
        store::find_employee(&mut tx, employee_id).await?;
        store::salary_records_for_employee(&mut tx, employee_id).await
    }

    /// Builds the payslip for an employee and period.
    ///
    /// # Returns
    ///
    /// Returns an error if:
    /// - The period is invalid (`InvalidPeriod`)
    /// - The employee does not exist (`EmployeeNotFound`)
    /// - Payroll has not been run for the period (`SalaryRecordNotFound`)
    pub async fn payslip(
        &self,
        employee_id: EmployeeId,
        month: u32,
        year: i32,
    ) -> EngineResult<Payslip> {
        let period = PayPeriod::new(month, year)?;
        let mut tx = self.db.begin_read().await?;
        let employee = store::find_employee(&mut tx, employee_id).await?;
        let record = store::find_salary_record(&mut tx, employee_id, period)
            .await?
            .ok_or(EngineError::SalaryRecordNotFound {
                employee_id,
                month,
                year,
            })?;
        let department = store::find_department(&mut tx, employee.department_id).await?;
        Ok(Payslip::new(&employee, &department, period, record))
    }

    /// Builds the report of one department for a period.
    ///
    /// Employees without a record for the period are left out.
    pub async fn department_report(
        &self,
        department_id: DepartmentId,
        month: u32,
        year: i32,
    ) -> EngineResult<DepartmentReport> {
        let period = PayPeriod::new(month, year)?;
        let mut tx = self.db.begin_read().await?;
        let department = store::find_department(&mut tx, department_id).await?;
        let employees: HashMap<_, _> =
            store::list_employees_in_department(&mut tx, department_id)
                .await?
                .into_iter()
                .map(|employee| (employee.id, employee))
                .collect();
        let lines = store::salary_records_for_department(&mut tx, department_id, period)
            .await?
            .iter()
            .filter_map(|record| {
                employees
                    .get(&record.employee_id)
                    .map(|employee| DepartmentReportLine::new(employee, record))
            })
            .collect();
        Ok(DepartmentReport::new(&department, period, lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Actor, EmployeeUpdate, NewDepartment, NewEmployee};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    async fn setup_with(computer: SalaryComputer) -> (PayrollLedger, DepartmentId) {
        let db = Arc::new(Database::in_memory().await.unwrap());
        let department = db
            .create_department(NewDepartment {
                name: "Engineering".to_string(),
                location: "Pune".to_string(),
                manager_id: None,
            })
            .await
            .unwrap();
        (PayrollLedger::new(db, computer), department.id)
    }

    async fn setup() -> (PayrollLedger, DepartmentId) {
        setup_with(SalaryComputer::default()).await
    }

    async fn hire(
        ledger: &PayrollLedger,
        department_id: DepartmentId,
        name: &str,
        salary: &str,
    ) -> EmployeeId {
        ledger
            .database()
            .create_employee(
                NewEmployee {
                    name: name.to_string(),
                    email: format!("{}@example.com", name.to_lowercase()),
                    phone: String::new(),
                    hire_date: NaiveDate::from_ymd_opt(2022, 1, 10).unwrap(),
                    department_id,
                    designation: "Engineer".to_string(),
                    basic_salary: dec(salary),
                },
                &Actor::system(),
            )
            .await
            .unwrap()
            .employee
            .id
    }

    #[tokio::test]
    async fn test_run_payroll_30000() {
        let (ledger, department_id) = setup().await;
        let id = hire(&ledger, department_id, "Asha", "30000").await;

        let record = ledger.run_payroll(id, 1, 2024).await.unwrap();

        assert_eq!(record.basic_salary, dec("30000"));
        assert_eq!(record.hra, dec("12000"));
        assert_eq!(record.bonus, dec("3000"));
        assert_eq!(record.gross_salary, dec("45000"));
        assert_eq!(record.tax, dec("458.33"));
        assert_eq!(record.net_salary, dec("44541.67"));
    }

    #[tokio::test]
    async fn test_run_payroll_is_idempotent() {
        let (ledger, department_id) = setup().await;
        let id = hire(&ledger, department_id, "Asha", "30000").await;

        let first = ledger.run_payroll(id, 1, 2024).await.unwrap();
        let second = ledger.run_payroll(id, 1, 2024).await.unwrap();

        let mut second_without_time = second.clone();
        second_without_time.computed_at = first.computed_at;
        assert_eq!(first, second_without_time);
        assert_eq!(ledger.records_for_period(1, 2024).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rerun_after_salary_change_updates_in_place() {
        let (ledger, department_id) = setup().await;
        let id = hire(&ledger, department_id, "Asha", "30000").await;
        let first = ledger.run_payroll(id, 1, 2024).await.unwrap();

        ledger
            .database()
            .update_employee(id, EmployeeUpdate::basic_salary(dec("100000")), &Actor::system())
            .await
            .unwrap();
        let audit_before = ledger.database().audit_log(100).await.unwrap().len();
        let second = ledger.run_payroll(id, 1, 2024).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.basic_salary, dec("100000"));
        assert_eq!(second.tax, dec("14375.00"));
        assert_eq!(second.net_salary, dec("135625.00"));
        assert_eq!(ledger.records_for_employee(id).await.unwrap().len(), 1);
        // Payroll runs are not audited.
        assert_eq!(ledger.database().audit_log(100).await.unwrap().len(), audit_before);
    }

    #[tokio::test]
    async fn test_run_payroll_for_missing_employee_writes_nothing() {
        let (ledger, _) = setup().await;

        let result = ledger.run_payroll(EmployeeId(99), 1, 2024).await;

        assert!(matches!(
            result,
            Err(EngineError::EmployeeNotFound { id: EmployeeId(99) })
        ));
        assert!(ledger.records_for_period(1, 2024).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_payroll_rejects_invalid_month() {
        let (ledger, department_id) = setup().await;
        let id = hire(&ledger, department_id, "Asha", "30000").await;

        for month in [0, 13] {
            assert!(matches!(
                ledger.run_payroll(id, month, 2024).await,
                Err(EngineError::InvalidPeriod { .. })
            ));
        }
        assert!(ledger.records_for_employee(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_payroll_for_period_covers_every_employee() {
        let (ledger, department_id) = setup().await;
        hire(&ledger, department_id, "Asha", "30000").await;
        hire(&ledger, department_id, "Ben", "100000").await;

        let records = ledger.run_payroll_for_period(3, 2024).await.unwrap();
        assert_eq!(records.len(), 2);

        // A second run overwrites rather than duplicates.
        ledger.run_payroll_for_period(3, 2024).await.unwrap();
        assert_eq!(ledger.records_for_period(3, 2024).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_payslip_joins_employee_and_department() {
        let (ledger, department_id) = setup().await;
        let id = hire(&ledger, department_id, "Asha", "30000").await;
        ledger.run_payroll(id, 2, 2024).await.unwrap();

        let payslip = ledger.payslip(id, 2, 2024).await.unwrap();

        assert_eq!(payslip.employee_name, "Asha");
        assert_eq!(payslip.department_name, "Engineering");
        assert_eq!(payslip.period, PayPeriod::new(2, 2024).unwrap());
        assert_eq!(payslip.record.net_salary, dec("44541.67"));
    }

    #[tokio::test]
    async fn test_payslip_without_run_is_not_found() {
        let (ledger, department_id) = setup().await;
        let id = hire(&ledger, department_id, "Asha", "30000").await;

        assert!(matches!(
            ledger.payslip(id, 2, 2024).await,
            Err(EngineError::SalaryRecordNotFound { month: 2, year: 2024, .. })
        ));
    }

    #[tokio::test]
    async fn test_department_report_totals() {
        let (ledger, department_id) = setup().await;
        let asha = hire(&ledger, department_id, "Asha", "30000").await;
        let ben = hire(&ledger, department_id, "Ben", "100000").await;
        hire(&ledger, department_id, "Cara", "20000").await;
        ledger.run_payroll(asha, 1, 2024).await.unwrap();
        ledger.run_payroll(ben, 1, 2024).await.unwrap();

        let report = ledger.department_report(department_id, 1, 2024).await.unwrap();

        assert_eq!(report.employee_count, 2);
        assert_eq!(report.total_net, dec("180166.67"));
        assert_eq!(report.average_net, dec("90083.34"));
        assert_eq!(report.lines[0].employee_name, "Asha");
    }

    #[tokio::test]
    async fn test_department_report_for_missing_department() {
        let (ledger, _) = setup().await;
        assert!(matches!(
            ledger.department_report(DepartmentId(5), 1, 2024).await,
            Err(EngineError::DepartmentNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_overflowing_computation_is_rejected_without_writing() {
        let computer = SalaryComputer::new(
            dec("100000000000000000000"),
            dec("0.10"),
            crate::calculation::TaxBase::Basic,
            crate::calculation::TaxSchedule::default(),
        );
        let (ledger, department_id) = setup_with(computer).await;
        let id = hire(&ledger, department_id, "Asha", "1000000000000").await;

        let result = ledger.run_payroll(id, 1, 2024).await;

        assert!(matches!(result, Err(EngineError::AmountOutOfRange { .. })));
        assert!(ledger.records_for_employee(id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_period_run_is_all_or_nothing() {
        let computer = SalaryComputer::new(
            dec("100000000000000000"),
            dec("0.10"),
            crate::calculation::TaxBase::Basic,
            crate::calculation::TaxSchedule::default(),
        );
        let (ledger, department_id) = setup_with(computer).await;
        // 30000 * 1e17 fits; 1e12 * 1e17 does not.
        hire(&ledger, department_id, "Asha", "30000").await;
        hire(&ledger, department_id, "Ben", "1000000000000").await;

        let result = ledger.run_payroll_for_period(6, 2024).await;

        assert!(matches!(result, Err(EngineError::AmountOutOfRange { .. })));
        assert!(ledger.records_for_period(6, 2024).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_largest_accepted_salary_computes() {
        let (ledger, department_id) = setup().await;
        let id = hire(&ledger, department_id, "Asha", "1000000000000").await;

        let record = ledger.run_payroll(id, 1, 2024).await.unwrap();

        assert_eq!(record.gross_salary, dec("1500000000000.00"));
        assert_eq!(record.net_salary, record.gross_salary - record.tax);
    }
}
