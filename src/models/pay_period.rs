//! Payroll period model.
//!
//! This module contains the [`PayPeriod`] type identifying the calendar month
//! a salary record is computed for.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A calendar month payroll is run for.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
///
/// let period = PayPeriod::new(3, 2024).unwrap();
/// assert_eq!(period.to_string(), "03/2024");
/// assert!(PayPeriod::new(13, 2024).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPayPeriod")]
pub struct PayPeriod {
    // Year before month so periods sort chronologically.
    year: i32,
    month: u32,
}

/// Unchecked wire form, validated through [`PayPeriod::new`].
#[derive(Deserialize)]
struct RawPayPeriod {
    year: i32,
    month: u32,
}

impl TryFrom<RawPayPeriod> for PayPeriod {
    type Error = EngineError;

    fn try_from(raw: RawPayPeriod) -> EngineResult<Self> {
        PayPeriod::new(raw.month, raw.year)
    }
}

impl PayPeriod {
    /// Creates a validated pay period.
    ///
    /// # Returns
    ///
    /// Returns `InvalidPeriod` if the month is outside 1..=12 or the year is not positive.
    pub fn new(month: u32, year: i32) -> EngineResult<Self> {
        if !(1..=12).contains(&month) || year <= 0 {
            return Err(EngineError::InvalidPeriod { month, year });
        }
        Ok(Self { year, month })
    }

    /// The month, 1 to 12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The year, always positive.
    pub fn year(&self) -> i32 {
        self.year
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}
