//! Core data models for the Payroll Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod audit_entry;
mod department;
mod employee;
mod ids;
mod pay_period;
mod salary_record;

pub use audit_entry::{Actor, AuditEntry, ChangeKind};
pub use department::{Department, NewDepartment};
pub use employee::{Employee, EmployeeUpdate, NewEmployee};
pub use ids::{AuditEntryId, DepartmentId, EmployeeId, SalaryRecordId};
pub use pay_period::PayPeriod;
pub use salary_record::SalaryPeriodRecord;
