//! Calculation logic for the Payroll Engine.
//!
//! This module contains the pure salary arithmetic: the progressive tax
//! schedule and the derivation of HRA, bonus, gross and net pay from a
//! basic salary. Nothing here touches the store.

mod salary;
mod tax;

use rust_decimal::{Decimal, RoundingStrategy};

pub use salary::{
    SalaryBreakdown, SalaryComputer, TaxBase, default_bonus_ratio, default_hra_ratio,
};
pub use tax::{MONTHS_PER_YEAR, TaxBracket, TaxSchedule, calculate_tax};

/// Rounds a monetary amount to 2 decimal places, halves away from zero.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("458.335").unwrap()), Decimal::from_str("458.34").unwrap());
/// assert_eq!(round_money(Decimal::from_str("458.334").unwrap()), Decimal::from_str("458.33").unwrap());
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
