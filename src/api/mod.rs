//! HTTP API module for the Payroll Engine.
//!
//! This module provides the REST API endpoints for managing employees and
//! departments, running payroll, and reading payslips, department reports
//! and the salary audit trail.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ACTOR_HEADER, AuditQuery, DEFAULT_AUDIT_LIMIT, RunPayrollRequest, RunPeriodRequest,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
