//! Configuration loading and management for the Payroll Engine.
//!
//! This module loads salary ratios, the tax schedule and the storage and
//! server settings from a YAML file.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap();
//! println!("Binding to {}", config.config().server.bind_address);
//! ```

mod loader;
mod types;

pub use loader::{CONFIG_FILE_NAME, ConfigLoader};
pub use types::{PayrollConfig, SalaryConfig, ServerConfig, StorageConfig};
