//! Error types for the Payroll Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while managing employees,
//! running payroll and recording salary changes.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{DepartmentId, EmployeeId};

/// The main error type for the Payroll Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::{EngineError, ErrorKind};
/// use payroll_engine::models::EmployeeId;
///
/// let error = EngineError::EmployeeNotFound { id: EmployeeId(42) };
/// assert_eq!(error.to_string(), "Employee not found: 42");
/// assert_eq!(error.kind(), ErrorKind::NotFound);
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or failed validation.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No employee exists with the given id.
    #[error("Employee not found: {id}")]
    EmployeeNotFound {
        /// The employee id that was not found.
        id: EmployeeId,
    },

    /// No department exists with the given id.
    #[error("Department not found: {id}")]
    DepartmentNotFound {
        /// The department id that was not found.
        id: DepartmentId,
    },

    /// No salary record exists for the employee and period.
    #[error("Salary record not found for employee {employee_id} in {month:02}/{year}")]
    SalaryRecordNotFound {
        /// The employee the record was requested for.
        employee_id: EmployeeId,
        /// The requested month.
        month: u32,
        /// The requested year.
        year: i32,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee field '{field}': {message}")]
    InvalidEmployee {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A department record was invalid.
    #[error("Invalid department field '{field}': {message}")]
    InvalidDepartment {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The payroll period was outside the accepted range.
    #[error("Invalid payroll period: month {month}, year {year}")]
    InvalidPeriod {
        /// The requested month.
        month: u32,
        /// The requested year.
        year: i32,
    },

    /// A salary amount is too large for the payroll arithmetic.
    #[error("Amount out of range: {amount}")]
    AmountOutOfRange {
        /// The amount that could not be processed.
        amount: Decimal,
    },

    /// Another employee already uses this email address.
    #[error("Email address already in use: {email}")]
    DuplicateEmail {
        /// The conflicting email address.
        email: String,
    },

    /// A uniqueness or referential constraint of the store was violated.
    #[error("Constraint violation: {message}")]
    ConstraintViolation {
        /// A description of the violated constraint.
        message: String,
    },

    /// The underlying store failed.
    #[error("Store error: {message}")]
    StoreError {
        /// A description of the failure.
        message: String,
    },
}

/// Broad classification of [`EngineError`] values.
///
/// Callers that only need to know how to react to a failure (for example an
/// HTTP layer choosing a status code) match on the kind instead of every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced employee, department or salary record does not exist.
    NotFound,
    /// The request was rejected before any write.
    ValidationFailure,
    /// A store uniqueness or integrity constraint was violated.
    ConstraintViolation,
    /// The store or configuration failed unexpectedly.
    Unexpected,
}

impl EngineError {
    /// Returns the broad kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::EmployeeNotFound { .. }
            | EngineError::DepartmentNotFound { .. }
            | EngineError::SalaryRecordNotFound { .. } => ErrorKind::NotFound,
            EngineError::InvalidEmployee { .. }
            | EngineError::InvalidDepartment { .. }
            | EngineError::InvalidPeriod { .. }
            | EngineError::AmountOutOfRange { .. }
            | EngineError::DuplicateEmail { .. } => ErrorKind::ValidationFailure,
            EngineError::ConstraintViolation { .. } => ErrorKind::ConstraintViolation,
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::StoreError { .. } => ErrorKind::Unexpected,
        }
    }

    pub(crate) fn invalid_employee(field: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidEmployee {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(error: sqlx::Error) -> Self {
        match error.as_database_error() {
            Some(db)
                if db.is_unique_violation()
                    || db.is_foreign_key_violation()
                    || db.is_check_violation() =>
            {
                EngineError::ConstraintViolation {
                    message: db.message().to_string(),
                }
            }
            _ => EngineError::StoreError {
                message: error.to_string(),
            },
        }
    }
}

impl From<sqlx::migrate::MigrateError> for EngineError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        EngineError::StoreError {
            message: format!("migration failed: {}", error),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
