//! Salary component derivation.
//!
//! This module derives HRA, bonus, gross, tax and net pay from a monthly
//! basic salary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::{TaxSchedule, round_money};

/// Default HRA as a share of basic salary (40%).
pub fn default_hra_ratio() -> Decimal {
    Decimal::new(40, 2)
}

/// Default bonus as a share of basic salary (10%).
pub fn default_bonus_ratio() -> Decimal {
    Decimal::new(10, 2)
}

/// Which monthly amount is annualized for the tax lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBase {
    /// Tax is assessed on the basic salary.
    #[default]
    Basic,
    /// Tax is assessed on the gross salary.
    Gross,
}

/// The salary components derived for one month.
///
/// Only [`SalaryComputer::compute`] builds one, so `gross` is always
/// `basic + hra + bonus` and `net` is always `gross - tax`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalaryBreakdown {
    pub(crate) basic: Decimal,
    pub(crate) hra: Decimal,
    pub(crate) bonus: Decimal,
    pub(crate) gross: Decimal,
    pub(crate) tax: Decimal,
    pub(crate) net: Decimal,
}

impl SalaryBreakdown {
    /// Basic salary.
    pub fn basic(&self) -> Decimal {
        self.basic
    }

    /// House rent allowance.
    pub fn hra(&self) -> Decimal {
        self.hra
    }

    /// Bonus.
    pub fn bonus(&self) -> Decimal {
        self.bonus
    }

    /// Basic + HRA + bonus.
    pub fn gross(&self) -> Decimal {
        self.gross
    }

    /// Monthly tax.
    pub fn tax(&self) -> Decimal {
        self.tax
    }

    /// Gross minus tax.
    pub fn net(&self) -> Decimal {
        self.net
    }
}

/// Derives salary components from a basic salary.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::SalaryComputer;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let breakdown = SalaryComputer::default().compute(Decimal::from_str("30000").unwrap())?;
/// assert_eq!(breakdown.hra(), Decimal::from_str("12000").unwrap());
/// assert_eq!(breakdown.bonus(), Decimal::from_str("3000").unwrap());
/// assert_eq!(breakdown.gross(), Decimal::from_str("45000").unwrap());
/// assert_eq!(breakdown.tax(), Decimal::from_str("458.33").unwrap());
/// assert_eq!(breakdown.net(), Decimal::from_str("44541.67").unwrap());
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryComputer {
    hra_ratio: Decimal,
    bonus_ratio: Decimal,
    tax_base: TaxBase,
    schedule: TaxSchedule,
}

impl Default for SalaryComputer {
    fn default() -> Self {
        Self::new(
            default_hra_ratio(),
            default_bonus_ratio(),
            TaxBase::default(),
            TaxSchedule::default(),
        )
    }
}

impl SalaryComputer {
    /// Creates a computer with explicit ratios, tax base and schedule.
    pub fn new(
        hra_ratio: Decimal,
        bonus_ratio: Decimal,
        tax_base: TaxBase,
        schedule: TaxSchedule,
    ) -> Self {
        Self {
            hra_ratio,
            bonus_ratio,
            tax_base,
            schedule,
        }
    }

    /// Returns the HRA ratio.
    pub fn hra_ratio(&self) -> Decimal {
        self.hra_ratio
    }

    /// Returns the bonus ratio.
    pub fn bonus_ratio(&self) -> Decimal {
        self.bonus_ratio
    }

    /// Returns the tax schedule in use.
    pub fn schedule(&self) -> &TaxSchedule {
        &self.schedule
    }

    /// Derives every salary component from a basic salary.
    ///
    /// All amounts are rounded to 2 decimal places, and `net` is always
    /// exactly `gross - tax`.
    ///
    /// # Returns
    ///
    /// Returns `AmountOutOfRange` if any component overflows `Decimal`.
    pub fn compute(&self, basic_salary: Decimal) -> EngineResult<SalaryBreakdown> {
        let out_of_range = || EngineError::AmountOutOfRange {
            amount: basic_salary,
        };

        let basic = round_money(basic_salary);
        let hra = round_money(basic.checked_mul(self.hra_ratio).ok_or_else(out_of_range)?);
        let bonus = round_money(basic.checked_mul(self.bonus_ratio).ok_or_else(out_of_range)?);
        let gross = basic
            .checked_add(hra)
            .and_then(|sum| sum.checked_add(bonus))
            .ok_or_else(out_of_range)?;
        let taxable = match self.tax_base {
            TaxBase::Basic => basic,
            TaxBase::Gross => gross,
        };
        let tax = self.schedule.monthly_tax(taxable)?;
        let net = gross.checked_sub(tax).ok_or_else(out_of_range)?;

        debug!(
            basic = %basic,
            hra = %hra,
            bonus = %bonus,
            gross = %gross,
            tax = %tax,
            net = %net,
            "Computed salary breakdown"
        );

        Ok(SalaryBreakdown {
            basic,
            hra,
            bonus,
            gross,
            tax,
            net,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_compute_30000_basic() {
        let breakdown = SalaryComputer::default().compute(dec("30000")).unwrap();

        assert_eq!(breakdown.basic, dec("30000"));
        assert_eq!(breakdown.hra, dec("12000.00"));
        assert_eq!(breakdown.bonus, dec("3000.00"));
        assert_eq!(breakdown.gross, dec("45000.00"));
        assert_eq!(breakdown.tax, dec("458.33"));
        assert_eq!(breakdown.net, dec("44541.67"));
    }

    #[test]
    fn test_compute_100000_basic() {
        let breakdown = SalaryComputer::default().compute(dec("100000")).unwrap();

        assert_eq!(breakdown.gross, dec("150000.00"));
        assert_eq!(breakdown.tax, dec("14375.00"));
        assert_eq!(breakdown.net, dec("135625.00"));
    }

    #[test]
    fn test_compute_below_tax_threshold() {
        let breakdown = SalaryComputer::default().compute(dec("15000")).unwrap();

        assert_eq!(breakdown.gross, dec("22500.00"));
        assert_eq!(breakdown.tax, Decimal::ZERO);
        assert_eq!(breakdown.net, breakdown.gross);
    }

    #[test]
    fn test_compute_rounds_components() {
        // 12345.67 * 0.40 = 4938.268, * 0.10 = 1234.567
        let breakdown = SalaryComputer::default().compute(dec("12345.67")).unwrap();

        assert_eq!(breakdown.hra, dec("4938.27"));
        assert_eq!(breakdown.bonus, dec("1234.57"));
        assert_eq!(breakdown.gross, dec("18518.51"));
    }

    #[test]
    fn test_gross_tax_base() {
        let computer = SalaryComputer::new(
            default_hra_ratio(),
            default_bonus_ratio(),
            TaxBase::Gross,
            TaxSchedule::default(),
        );
        // gross 45,000 * 12 = 540,000; 12,500 + 40,000 * 20% = 20,500; / 12 = 1708.333
        let breakdown = computer.compute(dec("30000")).unwrap();

        assert_eq!(breakdown.tax, dec("1708.33"));
        assert_eq!(breakdown.net, dec("43291.67"));
    }

    #[test]
    fn test_custom_ratios() {
        let computer = SalaryComputer::new(
            dec("0.50"),
            dec("0"),
            TaxBase::Basic,
            TaxSchedule::default(),
        );
        let breakdown = computer.compute(dec("10000")).unwrap();

        assert_eq!(breakdown.hra, dec("5000"));
        assert_eq!(breakdown.bonus, Decimal::ZERO);
        assert_eq!(breakdown.gross, dec("15000"));
    }

    #[test]
    fn test_tax_base_deserialization() {
        let base: TaxBase = serde_json::from_str("\"gross\"").unwrap();
        assert_eq!(base, TaxBase::Gross);
    }

    #[test]
    fn test_overflowing_basic_is_rejected() {
        let result = SalaryComputer::default().compute(dec("10000000000000000000000000000"));
        assert!(matches!(result, Err(EngineError::AmountOutOfRange { .. })));
    }

    #[test]
    fn test_accessors_expose_components() {
        let breakdown = SalaryComputer::default().compute(dec("30000")).unwrap();
        assert_eq!(breakdown.basic(), breakdown.basic);
        assert_eq!(breakdown.gross(), breakdown.basic() + breakdown.hra() + breakdown.bonus());
        assert_eq!(breakdown.net(), breakdown.gross() - breakdown.tax());
    }

    proptest! {
        #[test]
        fn prop_net_is_gross_minus_tax(cents in 1u64..100_000_000u64) {
            let basic = Decimal::new(cents as i64, 2);
            let breakdown = SalaryComputer::default().compute(basic).unwrap();
            prop_assert_eq!(breakdown.net, breakdown.gross - breakdown.tax);
        }

        #[test]
        fn prop_gross_is_one_and_a_half_times_basic(cents in 1u64..100_000_000u64) {
            // Rounding HRA and bonus separately can differ from 1.5x by at most a cent.
            let basic = Decimal::new(cents as i64, 2);
            let breakdown = SalaryComputer::default().compute(basic).unwrap();
            prop_assert_eq!(breakdown.gross, breakdown.basic + breakdown.hra + breakdown.bonus);
            prop_assert!((breakdown.gross - basic * dec("1.5")).abs() <= dec("0.01"));
        }
    }
}
