//! Monthly Payroll Engine
//!
//! This crate manages employees and departments, computes monthly salary
//! records (basic, HRA, bonus, gross, tax, net) under a progressive tax
//! schedule, and keeps an append-only audit trail of basic salary changes.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod reports;
pub mod store;
