//! Department table operations.

use sqlx::SqliteConnection;

use crate::error::{EngineError, EngineResult};
use crate::models::{Department, DepartmentId, NewDepartment};

use super::rows::DepartmentRow;

/// Validates and inserts a department with a freshly allocated id.
///
/// The manager reference is stored as given and not checked.
pub(crate) async fn insert_department(
    conn: &mut SqliteConnection,
    fields: NewDepartment,
) -> EngineResult<Department> {
    for (field, value) in [("name", &fields.name), ("location", &fields.location)] {
        if value.trim().is_empty() {
            return Err(EngineError::InvalidDepartment {
                field: field.to_string(),
                message: "must not be empty".to_string(),
            });
        }
    }

    let row = sqlx::query_as::<_, DepartmentRow>(
        "INSERT INTO departments (name, location, manager_id) VALUES (?, ?, ?) RETURNING *",
    )
    .bind(&fields.name)
    .bind(&fields.location)
    .bind(fields.manager_id.map(|id| id.to_sql()))
    .fetch_one(conn)
    .await?;
    Ok(row.into())
}

/// Looks up a department.
pub(crate) async fn find_department(
    conn: &mut SqliteConnection,
    id: DepartmentId,
) -> EngineResult<Department> {
    sqlx::query_as::<_, DepartmentRow>("SELECT * FROM departments WHERE id = ?")
        .bind(id.to_sql())
        .fetch_optional(conn)
        .await?
        .map(Department::from)
        .ok_or(EngineError::DepartmentNotFound { id })
}

/// Returns whether a department exists.
pub(crate) async fn department_exists(
    conn: &mut SqliteConnection,
    id: DepartmentId,
) -> EngineResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM departments WHERE id = ?")
        .bind(id.to_sql())
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}

/// Returns all departments ordered by id.
pub(crate) async fn list_departments(conn: &mut SqliteConnection) -> EngineResult<Vec<Department>> {
    let rows = sqlx::query_as::<_, DepartmentRow>("SELECT * FROM departments ORDER BY id")
        .fetch_all(conn)
        .await?;
    Ok(rows.into_iter().map(Department::from).collect())
}
