//! Employee table operations.
//!
//! Every write that sets a basic salary goes through here and appends the
//! matching audit entry on the same transaction before returning.

use rust_decimal::Decimal;
use sqlx::SqliteConnection;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Actor, AuditEntry, DepartmentId, Employee, EmployeeId, EmployeeUpdate, NewEmployee,
};

use super::audit_log::record_salary_assignment;
use super::departments::department_exists;
use super::rows::EmployeeRow;

/// Maximum number of decimal places in a basic salary.
const SALARY_SCALE: u32 = 2;

/// Largest accepted monthly basic salary, 10^12. Keeps every derived amount
/// well inside `Decimal` range.
const MAX_BASIC_SALARY: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// The outcome of an employee write.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeWrite {
    /// The employee as stored after the write.
    pub employee: Employee,
    /// The audit entry appended by the write, if the salary was assigned.
    pub audit_entry: Option<AuditEntry>,
}

/// Lookup key enforcing case-insensitive email uniqueness.
fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_name(name: &str) -> EngineResult<()> {
    if name.trim().is_empty() {
        return Err(EngineError::invalid_employee("name", "must not be empty"));
    }
    Ok(())
}

fn validate_basic_salary(amount: Decimal) -> EngineResult<()> {
    if amount <= Decimal::ZERO {
        return Err(EngineError::invalid_employee(
            "basic_salary",
            format!("must be greater than zero, got {}", amount),
        ));
    }
    if amount > MAX_BASIC_SALARY {
        return Err(EngineError::invalid_employee(
            "basic_salary",
            format!("must not exceed {}, got {}", MAX_BASIC_SALARY, amount),
        ));
    }
    if amount.normalize().scale() > SALARY_SCALE {
        return Err(EngineError::invalid_employee(
            "basic_salary",
            format!("must have at most {} decimal places, got {}", SALARY_SCALE, amount),
        ));
    }
    Ok(())
}

/// Checks an email address is well formed and not used by another employee.
async fn validate_email(
    conn: &mut SqliteConnection,
    email: &str,
    owner: Option<EmployeeId>,
) -> EngineResult<()> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(EngineError::invalid_employee(
            "email",
            format!("'{}' is not a valid email address", email),
        ));
    }
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM employees WHERE email_key = ?")
        .bind(email_key(email))
        .fetch_optional(conn)
        .await?;
    match existing.map(EmployeeId::from_sql) {
        Some(existing) if Some(existing) != owner => Err(EngineError::DuplicateEmail {
            email: trimmed.to_string(),
        }),
        _ => Ok(()),
    }
}

async fn validate_department_reference(
    conn: &mut SqliteConnection,
    department_id: DepartmentId,
) -> EngineResult<()> {
    if !department_exists(conn, department_id).await? {
        return Err(EngineError::invalid_employee(
            "department_id",
            format!("department {} does not exist", department_id),
        ));
    }
    Ok(())
}

/// Validates and inserts an employee, recording a CREATE audit entry.
pub(crate) async fn insert_employee(
    conn: &mut SqliteConnection,
    fields: NewEmployee,
    actor: &Actor,
) -> EngineResult<EmployeeWrite> {
    validate_name(&fields.name)?;
    validate_email(&mut *conn, &fields.email, None).await?;
    validate_department_reference(&mut *conn, fields.department_id).await?;
    validate_basic_salary(fields.basic_salary)?;

    let row = sqlx::query_as::<_, EmployeeRow>(
        "INSERT INTO employees \
         (name, email, email_key, phone, hire_date, department_id, designation, basic_salary) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(&fields.name)
    .bind(&fields.email)
    .bind(email_key(&fields.email))
    .bind(&fields.phone)
    .bind(fields.hire_date)
    .bind(fields.department_id.to_sql())
    .bind(&fields.designation)
    .bind(fields.basic_salary.to_string())
    .fetch_one(&mut *conn)
    .await?;
    let employee = Employee::try_from(row)?;

    let audit_entry =
        record_salary_assignment(conn, employee.id, None, employee.basic_salary, actor).await?;

    Ok(EmployeeWrite {
        employee,
        audit_entry,
    })
}

/// Applies a partial update to an employee.
///
/// An UPDATE audit entry is recorded only when the basic salary changes.
pub(crate) async fn update_employee(
    conn: &mut SqliteConnection,
    id: EmployeeId,
    update: EmployeeUpdate,
    actor: &Actor,
) -> EngineResult<EmployeeWrite> {
    let mut employee = find_employee(&mut *conn, id).await?;
    if let Some(name) = &update.name {
        validate_name(name)?;
    }
    if let Some(email) = &update.email {
        validate_email(&mut *conn, email, Some(id)).await?;
    }
    if let Some(department_id) = update.department_id {
        validate_department_reference(&mut *conn, department_id).await?;
    }
    if let Some(amount) = update.basic_salary {
        validate_basic_salary(amount)?;
    }

    let previous_salary = employee.apply(update);
    sqlx::query(
        "UPDATE employees SET name = ?, email = ?, email_key = ?, phone = ?, hire_date = ?, \
         department_id = ?, designation = ?, basic_salary = ? WHERE id = ?",
    )
    .bind(&employee.name)
    .bind(&employee.email)
    .bind(email_key(&employee.email))
    .bind(&employee.phone)
    .bind(employee.hire_date)
    .bind(employee.department_id.to_sql())
    .bind(&employee.designation)
    .bind(employee.basic_salary.to_string())
    .bind(id.to_sql())
    .execute(&mut *conn)
    .await?;

    let audit_entry =
        record_salary_assignment(conn, id, Some(previous_salary), employee.basic_salary, actor)
            .await?;

    Ok(EmployeeWrite {
        employee,
        audit_entry,
    })
}

/// Looks up an employee.
pub(crate) async fn find_employee(
    conn: &mut SqliteConnection,
    id: EmployeeId,
) -> EngineResult<Employee> {
    let row = sqlx::query_as::<_, EmployeeRow>("SELECT * FROM employees WHERE id = ?")
        .bind(id.to_sql())
        .fetch_optional(conn)
        .await?
        .ok_or(EngineError::EmployeeNotFound { id })?;
    Employee::try_from(row)
}

/// Returns all employees ordered by id.
pub(crate) async fn list_employees(conn: &mut SqliteConnection) -> EngineResult<Vec<Employee>> {
    sqlx::query_as::<_, EmployeeRow>("SELECT * FROM employees ORDER BY id")
        .fetch_all(conn)
        .await?
        .into_iter()
        .map(Employee::try_from)
        .collect()
}

/// Returns the employees of one department ordered by id.
pub(crate) async fn list_employees_in_department(
    conn: &mut SqliteConnection,
    department_id: DepartmentId,
) -> EngineResult<Vec<Employee>> {
    sqlx::query_as::<_, EmployeeRow>("SELECT * FROM employees WHERE department_id = ? ORDER BY id")
        .bind(department_id.to_sql())
        .fetch_all(conn)
        .await?
        .into_iter()
        .map(Employee::try_from)
        .collect()
}
