//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from `payroll.yaml`. Every section has defaults, so an
//! empty file is a valid configuration.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{
    SalaryComputer, TaxBase, TaxSchedule, default_bonus_ratio, default_hra_ratio,
};
use crate::error::{EngineError, EngineResult};

/// Salary component ratios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalaryConfig {
    /// HRA as a share of basic salary.
    pub hra_ratio: Decimal,
    /// Bonus as a share of basic salary.
    pub bonus_ratio: Decimal,
    /// Which monthly amount tax is assessed on.
    pub tax_base: TaxBase,
}

impl Default for SalaryConfig {
    fn default() -> Self {
        Self {
            hra_ratio: default_hra_ratio(),
            bonus_ratio: default_bonus_ratio(),
            tax_base: TaxBase::default(),
        }
    }
}

/// Where the payroll database lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file, created if missing. When absent the store is
    /// an in-memory database that does not outlive the process.
    pub database_path: Option<PathBuf>,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind.
    pub bind_address: String,
    /// Actor recorded when a request carries no `X-Actor` header.
    pub default_actor: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            default_actor: "system".to_string(),
        }
    }
}

/// The complete payroll configuration.
///
/// # Example
///
/// ```
/// use payroll_engine::config::PayrollConfig;
///
/// let config: PayrollConfig = serde_yaml::from_str("salary:\n  hra_ratio: 0.5\n").unwrap();
/// assert_eq!(config.salary.hra_ratio.to_string(), "0.5");
/// assert_eq!(config.salary.bonus_ratio.to_string(), "0.10");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollConfig {
    /// Salary component ratios.
    pub salary: SalaryConfig,
    /// The tax bracket schedule.
    pub tax: TaxSchedule,
    /// Persistence settings.
    pub storage: StorageConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
}

impl PayrollConfig {
    /// Checks ratios and tax brackets.
    pub fn validate(&self) -> EngineResult<()> {
        for (name, ratio) in [
            ("salary.hra_ratio", self.salary.hra_ratio),
            ("salary.bonus_ratio", self.salary.bonus_ratio),
        ] {
            if ratio.is_sign_negative() {
                return Err(EngineError::ConfigParseError {
                    path: name.to_string(),
                    message: format!("ratio must not be negative, got {}", ratio),
                });
            }
        }
        self.tax.validate()
    }

    /// Builds the salary computer described by this configuration.
    pub fn salary_computer(&self) -> SalaryComputer {
        SalaryComputer::new(
            self.salary.hra_ratio,
            self.salary.bonus_ratio,
            self.salary.tax_base,
            self.tax.clone(),
        )
    }
}
