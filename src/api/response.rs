//! Response types for the Payroll Engine API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, ErrorKind};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a 400 response.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

fn error_code(error: &EngineError) -> &'static str {
    match error {
        EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => "CONFIG_ERROR",
        EngineError::EmployeeNotFound { .. } => "EMPLOYEE_NOT_FOUND",
        EngineError::DepartmentNotFound { .. } => "DEPARTMENT_NOT_FOUND",
        EngineError::SalaryRecordNotFound { .. } => "SALARY_RECORD_NOT_FOUND",
        EngineError::InvalidEmployee { .. } => "INVALID_EMPLOYEE",
        EngineError::InvalidDepartment { .. } => "INVALID_DEPARTMENT",
        EngineError::InvalidPeriod { .. } => "INVALID_PERIOD",
        EngineError::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
        EngineError::DuplicateEmail { .. } => "DUPLICATE_EMAIL",
        EngineError::ConstraintViolation { .. } => "CONSTRAINT_VIOLATION",
        EngineError::StoreError { .. } => "STORE_ERROR",
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let status = match error.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ValidationFailure => StatusCode::BAD_REQUEST,
            ErrorKind::ConstraintViolation => StatusCode::CONFLICT,
            ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let code = error_code(&error);
        let error = match error.kind() {
            ErrorKind::Unexpected => {
                ApiError::with_details(code, "Internal error", error.to_string())
            }
            _ => ApiError::new(code, error.to_string()),
        };
        ApiErrorResponse { status, error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DepartmentId, EmployeeId};

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details")); // Should be skipped when None
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response: ApiErrorResponse = EngineError::EmployeeNotFound { id: EmployeeId(4) }.into();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.error.code, "EMPLOYEE_NOT_FOUND");
        assert_eq!(response.error.message, "Employee not found: 4");
    }

    #[test]
    fn test_validation_failure_maps_to_400() {
        let response: ApiErrorResponse = EngineError::DuplicateEmail {
            email: "a@b.c".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "DUPLICATE_EMAIL");
    }

    #[test]
    fn test_amount_out_of_range_maps_to_400() {
        let response: ApiErrorResponse = EngineError::AmountOutOfRange {
            amount: rust_decimal::Decimal::MAX,
        }
        .into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "AMOUNT_OUT_OF_RANGE");
    }

    #[test]
    fn test_constraint_violation_maps_to_409() {
        let response: ApiErrorResponse = EngineError::ConstraintViolation {
            message: "duplicate".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_store_error_hides_message_behind_details() {
        let response: ApiErrorResponse = EngineError::StoreError {
            message: "disk full".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error.message, "Internal error");
        assert!(response.error.details.unwrap().contains("disk full"));
    }

    #[test]
    fn test_department_not_found_code() {
        let response: ApiErrorResponse =
            EngineError::DepartmentNotFound { id: DepartmentId(1) }.into();
        assert_eq!(response.error.code, "DEPARTMENT_NOT_FOUND");
    }
}
