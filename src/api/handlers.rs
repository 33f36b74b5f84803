//! HTTP request handlers for the Payroll Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{DepartmentId, EmployeeId, EmployeeUpdate, NewDepartment, NewEmployee};

use super::request::{AuditQuery, RunPayrollRequest, RunPeriodRequest};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/departments", post(create_department_handler))
        .route("/departments/:id", get(get_department_handler))
        .route(
            "/employees",
            post(create_employee_handler).get(list_employees_handler),
        )
        .route(
            "/employees/:id",
            get(get_employee_handler).patch(update_employee_handler),
        )
        .route("/employees/:id/audit", get(employee_audit_handler))
        .route("/payroll/run", post(run_payroll_handler))
        .route("/payroll/run-period", post(run_period_handler))
        .route(
            "/payslips/:employee_id/:year/:month",
            get(payslip_handler),
        )
        .route(
            "/reports/departments/:department_id/:year/:month",
            get(department_report_handler),
        )
        .route("/audit", get(audit_handler))
        .with_state(state)
}

/// Turns a JSON body rejection into a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::bad_request(error).into_response()
}

/// Turns a path or query string that failed to parse into a 400 response.
fn invalid_request(correlation_id: Uuid, part: &'static str, message: String) -> Response {
    warn!(
        correlation_id = %correlation_id,
        part,
        error = %message,
        "Invalid request parameters"
    );
    ApiErrorResponse::bad_request(ApiError::validation_error(message)).into_response()
}

/// Renders an engine result as JSON with the given success status.
fn respond<T: Serialize>(
    correlation_id: Uuid,
    operation: &'static str,
    success: StatusCode,
    result: EngineResult<T>,
) -> Response {
    match result {
        Ok(body) => (
            success,
            [(header::CONTENT_TYPE, "application/json")],
            Json(body),
        )
            .into_response(),
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                operation,
                error = %err,
                "Request failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}

/// Unwraps a JSON body or returns the rejection response.
macro_rules! json_body {
    ($payload:expr, $correlation_id:expr) => {
        match $payload {
            Ok(Json(body)) => body,
            Err(rejection) => return rejection_response($correlation_id, rejection),
        }
    };
}

/// Unwraps a path or query extractor or returns a validation error response.
macro_rules! params {
    ($extractor:ident, $payload:expr, $correlation_id:expr, $part:literal) => {
        match $payload {
            Ok($extractor(value)) => value,
            Err(rejection) => {
                return invalid_request($correlation_id, $part, rejection.body_text());
            }
        }
    };
}

/// Handler for POST /departments.
async fn create_department_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewDepartment>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let fields = json_body!(payload, correlation_id);
    info!(correlation_id = %correlation_id, "Creating department");

    let result = state.database().create_department(fields).await;
    respond(correlation_id, "create_department", StatusCode::CREATED, result)
}

/// Handler for GET /departments/:id.
async fn get_department_handler(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = params!(Path, path, correlation_id, "path");
    let result = state.database().department(DepartmentId(id)).await;
    respond(correlation_id, "get_department", StatusCode::OK, result)
}

/// Handler for POST /employees.
async fn create_employee_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<NewEmployee>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let fields = json_body!(payload, correlation_id);
    let actor = state.actor(&headers);
    info!(correlation_id = %correlation_id, actor = %actor, "Creating employee");

    let result = state
        .database()
        .create_employee(fields, &actor)
        .await
        .map(|write| write.employee);
    respond(correlation_id, "create_employee", StatusCode::CREATED, result)
}

/// Handler for GET /employees.
async fn list_employees_handler(State(state): State<AppState>) -> Response {
    let result = state.database().employees().await;
    respond(Uuid::new_v4(), "list_employees", StatusCode::OK, result)
}

/// Handler for GET /employees/:id.
async fn get_employee_handler(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = params!(Path, path, correlation_id, "path");
    let result = state.database().employee(EmployeeId(id)).await;
    respond(correlation_id, "get_employee", StatusCode::OK, result)
}

/// Handler for PATCH /employees/:id.
async fn update_employee_handler(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    headers: HeaderMap,
    payload: Result<Json<EmployeeUpdate>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = params!(Path, path, correlation_id, "path");
    let update = json_body!(payload, correlation_id);
    let actor = state.actor(&headers);
    info!(
        correlation_id = %correlation_id,
        employee_id = id,
        actor = %actor,
        "Updating employee"
    );

    let result = state
        .database()
        .update_employee(EmployeeId(id), update, &actor)
        .await
        .map(|write| write.employee);
    respond(correlation_id, "update_employee", StatusCode::OK, result)
}

/// Handler for GET /employees/:id/audit.
async fn employee_audit_handler(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let id = params!(Path, path, correlation_id, "path");
    let result = state
        .database()
        .audit_log_for_employee(EmployeeId(id))
        .await;
    respond(correlation_id, "employee_audit", StatusCode::OK, result)
}

/// Handler for POST /payroll/run.
async fn run_payroll_handler(
    State(state): State<AppState>,
    payload: Result<Json<RunPayrollRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = json_body!(payload, correlation_id);
    info!(
        correlation_id = %correlation_id,
        employee_id = %request.employee_id,
        month = request.month,
        year = request.year,
        "Running payroll"
    );

    let result = state
        .ledger()
        .run_payroll(request.employee_id, request.month, request.year)
        .await;
    respond(correlation_id, "run_payroll", StatusCode::OK, result)
}

/// Handler for POST /payroll/run-period.
async fn run_period_handler(
    State(state): State<AppState>,
    payload: Result<Json<RunPeriodRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = json_body!(payload, correlation_id);
    info!(
        correlation_id = %correlation_id,
        month = request.month,
        year = request.year,
        "Running payroll for period"
    );

    let result = state
        .ledger()
        .run_payroll_for_period(request.month, request.year)
        .await;
    respond(correlation_id, "run_payroll_for_period", StatusCode::OK, result)
}

/// Handler for GET /payslips/:employee_id/:year/:month.
async fn payslip_handler(
    State(state): State<AppState>,
    path: Result<Path<(u64, i32, u32)>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (employee_id, year, month) = params!(Path, path, correlation_id, "path");
    let result = state
        .ledger()
        .payslip(EmployeeId(employee_id), month, year)
        .await;
    respond(correlation_id, "payslip", StatusCode::OK, result)
}

/// Handler for GET /reports/departments/:department_id/:year/:month.
async fn department_report_handler(
    State(state): State<AppState>,
    path: Result<Path<(u64, i32, u32)>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let (department_id, year, month) = params!(Path, path, correlation_id, "path");
    let result = state
        .ledger()
        .department_report(DepartmentId(department_id), month, year)
        .await;
    respond(correlation_id, "department_report", StatusCode::OK, result)
}

/// Handler for GET /audit.
async fn audit_handler(
    State(state): State<AppState>,
    query: Result<Query<AuditQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let query = params!(Query, query, correlation_id, "query");
    let result = state.database().audit_log(query.limit()).await;
    respond(correlation_id, "audit_log", StatusCode::OK, result)
}
