//! Request types for the Payroll Engine API.
//!
//! Employee and department bodies deserialize straight into
//! [`NewEmployee`](crate::models::NewEmployee),
//! [`EmployeeUpdate`](crate::models::EmployeeUpdate) and
//! [`NewDepartment`](crate::models::NewDepartment). This module holds the
//! bodies that have no model counterpart.

use serde::{Deserialize, Serialize};

use crate::models::EmployeeId;

/// Default number of entries returned by `GET /audit`.
pub const DEFAULT_AUDIT_LIMIT: usize = 50;

/// Request header naming the acting principal.
pub const ACTOR_HEADER: &str = "x-actor";

/// Request body for `POST /payroll/run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPayrollRequest {
    /// The employee to run payroll for.
    pub employee_id: EmployeeId,
    /// The month, 1 to 12.
    pub month: u32,
    /// The year.
    pub year: i32,
}

/// Request body for `POST /payroll/run-period`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPeriodRequest {
    /// The month, 1 to 12.
    pub month: u32,
    /// The year.
    pub year: i32,
}

/// Query string for `GET /audit`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    /// Maximum number of entries, newest first.
    pub limit: Option<usize>,
}

impl AuditQuery {
    /// Returns the requested limit or the default.
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_AUDIT_LIMIT)
    }
}
