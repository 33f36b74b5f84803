//! Transactional payroll store on SQLite.
//!
//! The store holds employees, departments, salary period records and the
//! salary audit log. Every write runs in one SQLite transaction through a
//! [`WriteTx`]: an employee row and its audit entry commit together or not at
//! all, and a dropped transaction rolls back. Writers are serialized so a
//! transaction never fails on a lock held by another writer.
//!
//! # Example
//!
//! ```
//! use payroll_engine::models::{Actor, NewDepartment, NewEmployee};
//! use payroll_engine::store::Database;
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let db = Database::in_memory().await?;
//! let department = db
//!     .create_department(NewDepartment {
//!         name: "Engineering".to_string(),
//!         location: "Pune".to_string(),
//!         manager_id: None,
//!     })
//!     .await?;
//! db.create_employee(
//!     NewEmployee {
//!         name: "Asha Rao".to_string(),
//!         email: "asha@example.com".to_string(),
//!         phone: String::new(),
//!         hire_date: NaiveDate::from_ymd_opt(2021, 4, 1).unwrap(),
//!         department_id: department.id,
//!         designation: "Engineer".to_string(),
//!         basic_salary: Decimal::new(30000, 0),
//!     },
//!     &Actor::new("hr.admin"),
//! )
//! .await?;
//! assert_eq!(db.audit_log(10).await?.len(), 1);
//! # Ok::<(), payroll_engine::error::EngineError>(())
//! # }).unwrap();
//! ```

mod audit_log;
mod departments;
mod employees;
mod rows;
mod salary_records;

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Actor, AuditEntry, Department, DepartmentId, Employee, EmployeeId, EmployeeUpdate,
    NewDepartment, NewEmployee,
};

pub use employees::EmployeeWrite;
pub use salary_records::UpsertOutcome;

pub(crate) use departments::find_department;
pub(crate) use employees::{find_employee, list_employees, list_employees_in_department};
pub(crate) use salary_records::{
    find_salary_record, salary_records_for_department, salary_records_for_employee,
    salary_records_for_period, upsert_salary_record,
};

/// Connections kept open to a database file.
const FILE_POOL_SIZE: u32 = 5;

/// The payroll store.
#[derive(Debug)]
pub struct Database {
    pool: SqlitePool,
    /// Serializes writers.
    writer: Mutex<()>,
}

/// An open write transaction holding the writer lock.
///
/// Dropping it without [`WriteTx::commit`] rolls the transaction back.
pub(crate) struct WriteTx<'a> {
    // Declared first so the transaction ends before the lock is released.
    tx: Transaction<'static, Sqlite>,
    _writer: MutexGuard<'a, ()>,
}

impl WriteTx<'_> {
    /// The connection the transaction runs on.
    pub(crate) fn conn(&mut self) -> &mut SqliteConnection {
        &mut *self.tx
    }

    /// Commits every write made through this transaction.
    pub(crate) async fn commit(self) -> EngineResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

impl Database {
    /// Creates an empty store that lives only as long as this value.
    pub async fn in_memory() -> EngineResult<Self> {
        // The database lives only while a connection to it is open, so the
        // pool keeps exactly one and never recycles it.
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::migrated(pool).await
    }

    /// Opens (creating if missing) a store in an SQLite database file.
    ///
    /// Pending schema migrations are applied before the store is returned.
    ///
    /// # Returns
    ///
    /// Returns `StoreError` if the file cannot be opened or migrated.
    pub async fn open<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(FILE_POOL_SIZE)
            .connect_with(options)
            .await?;
        info!(path = %path.display(), "Opened payroll database");
        Self::migrated(pool).await
    }

    async fn migrated(pool: SqlitePool) -> EngineResult<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self {
            pool,
            writer: Mutex::new(()),
        })
    }

    /// Starts a write transaction, waiting for any other writer to finish.
    pub(crate) async fn begin_write(&self) -> EngineResult<WriteTx<'_>> {
        let writer = self.writer.lock().await;
        let tx = self.pool.begin().await?;
        Ok(WriteTx {
            tx,
            _writer: writer,
        })
    }

    /// Starts a transaction for a consistent multi-query read.
    pub(crate) async fn begin_read(&self) -> EngineResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Creates a department.
    pub async fn create_department(&self, fields: NewDepartment) -> EngineResult<Department> {
        let mut tx = self.begin_write().await?;
        let department = match departments::insert_department(tx.conn(), fields).await {
            Ok(department) => department,
            Err(err) => return Err(rolled_back("create_department", err)),
        };
        tx.commit().await?;
        info!(department_id = %department.id, name = %department.name, "Created department");
        Ok(department)
    }

    /// Looks up a department.
    pub async fn department(&self, id: DepartmentId) -> EngineResult<Department> {
        let mut conn = self.pool.acquire().await?;
        departments::find_department(&mut conn, id).await
    }

    /// Lists all departments ordered by id.
    pub async fn departments(&self) -> EngineResult<Vec<Department>> {
        let mut conn = self.pool.acquire().await?;
        departments::list_departments(&mut conn).await
    }

    /// Creates an employee and records the initial salary in the audit log.
    pub async fn create_employee(
        &self,
        fields: NewEmployee,
        actor: &Actor,
    ) -> EngineResult<EmployeeWrite> {
        let mut tx = self.begin_write().await?;
        let write = match employees::insert_employee(tx.conn(), fields, actor).await {
            Ok(write) => write,
            Err(err) => return Err(rolled_back("create_employee", err)),
        };
        tx.commit().await?;
        info!(
            employee_id = %write.employee.id,
            basic_salary = %write.employee.basic_salary,
            actor = %actor,
            "Created employee"
        );
        Ok(write)
    }

    /// Updates an employee, recording a salary change in the audit log.
    pub async fn update_employee(
        &self,
        id: EmployeeId,
        update: EmployeeUpdate,
        actor: &Actor,
    ) -> EngineResult<EmployeeWrite> {
        let mut tx = self.begin_write().await?;
        let write = match employees::update_employee(tx.conn(), id, update, actor).await {
            Ok(write) => write,
            Err(err) => return Err(rolled_back("update_employee", err)),
        };
        tx.commit().await?;
        info!(
            employee_id = %id,
            salary_changed = write.audit_entry.is_some(),
            actor = %actor,
            "Updated employee"
        );
        Ok(write)
    }

    /// Looks up an employee.
    pub async fn employee(&self, id: EmployeeId) -> EngineResult<Employee> {
        let mut conn = self.pool.acquire().await?;
        employees::find_employee(&mut conn, id).await
    }

    /// Lists all employees ordered by id.
    pub async fn employees(&self) -> EngineResult<Vec<Employee>> {
        let mut conn = self.pool.acquire().await?;
        employees::list_employees(&mut conn).await
    }

    /// Returns up to `limit` audit entries, newest first.
    pub async fn audit_log(&self, limit: usize) -> EngineResult<Vec<AuditEntry>> {
        let mut conn = self.pool.acquire().await?;
        audit_log::recent_entries(&mut conn, limit).await
    }

    /// Returns the audit entries of one employee, newest first.
    pub async fn audit_log_for_employee(&self, id: EmployeeId) -> EngineResult<Vec<AuditEntry>> {
        let mut tx = self.begin_read().await?;
        employees::find_employee(&mut tx, id).await?;
        audit_log::entries_for_employee(&mut tx, id).await
    }
}

/// Logs a failed write. The caller drops its transaction, rolling it back.
pub(crate) fn rolled_back(operation: &str, err: EngineError) -> EngineError {
    warn!(operation, error = %err, "Transaction rolled back");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChangeKind;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn new_department() -> NewDepartment {
        NewDepartment {
            name: "Engineering".to_string(),
            location: "Pune".to_string(),
            manager_id: None,
        }
    }

    fn new_employee(department_id: DepartmentId) -> NewEmployee {
        NewEmployee {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: String::new(),
            hire_date: NaiveDate::from_ymd_opt(2021, 4, 1).unwrap(),
            department_id,
            designation: "Engineer".to_string(),
            basic_salary: Decimal::new(30000, 0),
        }
    }

    #[tokio::test]
    async fn test_dropped_transaction_leaves_no_trace() {
        let db = Database::in_memory().await.unwrap();
        let department = db.create_department(new_department()).await.unwrap();

        {
            let mut tx = db.begin_write().await.unwrap();
            employees::insert_employee(tx.conn(), new_employee(department.id), &Actor::system())
                .await
                .unwrap();
            // Dropped without commit.
        }

        assert!(db.employees().await.unwrap().is_empty());
        assert!(db.audit_log(10).await.unwrap().is_empty());

        // The employee id was not consumed either.
        let write = db
            .create_employee(new_employee(department.id), &Actor::system())
            .await
            .unwrap();
        assert_eq!(write.employee.id, EmployeeId(1));
    }

    #[tokio::test]
    async fn test_create_and_update_through_database() {
        let db = Database::in_memory().await.unwrap();
        let department = db.create_department(new_department()).await.unwrap();
        let created = db
            .create_employee(new_employee(department.id), &Actor::new("hr"))
            .await
            .unwrap();

        db.update_employee(
            created.employee.id,
            EmployeeUpdate::basic_salary(Decimal::new(32000, 0)),
            &Actor::new("hr"),
        )
        .await
        .unwrap();

        assert_eq!(
            db.employee(created.employee.id).await.unwrap().basic_salary,
            Decimal::new(32000, 0)
        );
        let trail = db.audit_log_for_employee(created.employee.id).await.unwrap();
        let kinds: Vec<_> = trail.iter().map(|entry| entry.change_kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Update, ChangeKind::Create]);
    }

    #[tokio::test]
    async fn test_audit_log_for_missing_employee_is_not_found() {
        let db = Database::in_memory().await.unwrap();
        assert!(matches!(
            db.audit_log_for_employee(EmployeeId(3)).await,
            Err(EngineError::EmployeeNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_audit_log_rows_cannot_be_changed() {
        let db = Database::in_memory().await.unwrap();
        let department = db.create_department(new_department()).await.unwrap();
        db.create_employee(new_employee(department.id), &Actor::system())
            .await
            .unwrap();

        let update = sqlx::query("UPDATE salary_audit_log SET new_salary = '1'")
            .execute(&db.pool)
            .await;
        let delete = sqlx::query("DELETE FROM salary_audit_log")
            .execute(&db.pool)
            .await;

        assert!(update.is_err());
        assert!(delete.is_err());
        assert_eq!(db.audit_log(10).await.unwrap()[0].new_salary, Decimal::new(30000, 0));
    }

    #[tokio::test]
    async fn test_database_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payroll.db");

        {
            let db = Database::open(&path).await.unwrap();
            let department = db.create_department(new_department()).await.unwrap();
            db.create_employee(new_employee(department.id), &Actor::system())
                .await
                .unwrap();
            db.pool.close().await;
        }
        assert!(path.exists());

        let reopened = Database::open(&path).await.unwrap();
        assert_eq!(reopened.employees().await.unwrap().len(), 1);
        assert_eq!(reopened.audit_log(10).await.unwrap().len(), 1);
        assert_eq!(reopened.departments().await.unwrap().len(), 1);

        // Ids continue after the stored rows.
        let mut second = new_employee(DepartmentId(1));
        second.email = "second@example.com".to_string();
        let write = reopened
            .create_employee(second, &Actor::system())
            .await
            .unwrap();
        assert_eq!(write.employee.id, EmployeeId(2));
    }

    #[tokio::test]
    async fn test_open_rejects_file_that_is_not_a_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payroll.db");
        std::fs::write(&path, "not an sqlite database\n".repeat(64)).unwrap();

        assert!(matches!(
            Database::open(&path).await,
            Err(EngineError::StoreError { .. })
        ));
    }

    #[tokio::test]
    async fn test_row_breaking_arithmetic_is_reported_on_read() {
        let db = Database::in_memory().await.unwrap();
        let department = db.create_department(new_department()).await.unwrap();
        let employee_id = db
            .create_employee(new_employee(department.id), &Actor::system())
            .await
            .unwrap()
            .employee
            .id;
        sqlx::query(
            "INSERT INTO salary_records (employee_id, month, year, basic_salary, hra, bonus, \
             gross_salary, tax, net_salary, computed_at) \
             VALUES (?, 1, 2024, '30000', '12000', '3000', '99999', '0', '99999', ?)",
        )
        .bind(employee_id.to_sql())
        .bind(chrono::Utc::now())
        .execute(&db.pool)
        .await
        .unwrap();

        let mut conn = db.pool.acquire().await.unwrap();
        let result = salary_records_for_employee(&mut conn, employee_id).await;
        assert!(matches!(result, Err(EngineError::ConstraintViolation { .. })));
    }

    #[tokio::test]
    async fn test_schema_rejects_month_thirteen() {
        let db = Database::in_memory().await.unwrap();
        let department = db.create_department(new_department()).await.unwrap();
        let employee_id = db
            .create_employee(new_employee(department.id), &Actor::system())
            .await
            .unwrap()
            .employee
            .id;

        let result: EngineResult<_> = sqlx::query(
            "INSERT INTO salary_records (employee_id, month, year, basic_salary, hra, bonus, \
             gross_salary, tax, net_salary, computed_at) \
             VALUES (?, 13, 2024, '1', '0', '0', '1', '0', '1', ?)",
        )
        .bind(employee_id.to_sql())
        .bind(chrono::Utc::now())
        .execute(&db.pool)
        .await
        .map_err(EngineError::from);

        assert!(matches!(result, Err(EngineError::ConstraintViolation { .. })));
    }
}
