//! Income tax withholding.
//!
//! Monthly tax is derived by annualizing the monthly amount, applying a
//! progressive bracket schedule to the annual figure, and spreading the annual
//! tax back over twelve months.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::round_money;

/// Number of pay periods in a year.
pub const MONTHS_PER_YEAR: u32 = 12;

/// One bracket of a progressive tax schedule.
///
/// Income above the previous bracket's `up_to` (or zero for the first bracket)
/// is taxed at `rate`, on top of the fixed `base` owed for all income below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive upper bound of annual income for this bracket. `None` for the top bracket.
    #[serde(default)]
    pub up_to: Option<Decimal>,
    /// Annual tax owed at the bracket's lower bound.
    pub base: Decimal,
    /// Marginal rate applied above the lower bound.
    pub rate: Decimal,
}

/// A progressive annual tax schedule.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::TaxSchedule;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let schedule = TaxSchedule::default();
/// let tax = schedule.monthly_tax(Decimal::from_str("30000").unwrap())?;
/// assert_eq!(tax, Decimal::from_str("458.33").unwrap());
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSchedule {
    brackets: Vec<TaxBracket>,
}

impl Default for TaxSchedule {
    /// The four-bracket schedule: nil to 250,000, 5% to 500,000,
    /// 20% to 1,000,000 and 30% above.
    fn default() -> Self {
        Self {
            brackets: vec![
                TaxBracket {
                    up_to: Some(Decimal::new(250_000, 0)),
                    base: Decimal::ZERO,
                    rate: Decimal::ZERO,
                },
                TaxBracket {
                    up_to: Some(Decimal::new(500_000, 0)),
                    base: Decimal::ZERO,
                    rate: Decimal::new(5, 2),
                },
                TaxBracket {
                    up_to: Some(Decimal::new(1_000_000, 0)),
                    base: Decimal::new(12_500, 0),
                    rate: Decimal::new(20, 2),
                },
                TaxBracket {
                    up_to: None,
                    base: Decimal::new(112_500, 0),
                    rate: Decimal::new(30, 2),
                },
            ],
        }
    }
}

impl TaxSchedule {
    /// Creates a schedule from brackets ordered by ascending threshold.
    ///
    /// # Returns
    ///
    /// Returns an error if:
    /// - There are no brackets
    /// - Thresholds are not strictly ascending
    /// - Any bracket other than the last is open-ended, or the last is bounded
    /// - Any rate or base is negative
    pub fn new(brackets: Vec<TaxBracket>) -> EngineResult<Self> {
        let schedule = Self { brackets };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Checks the bracket invariants described on [`TaxSchedule::new`].
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: String| EngineError::ConfigParseError {
            path: "tax.brackets".to_string(),
            message,
        };

        let Some((last, bounded)) = self.brackets.split_last() else {
            return Err(invalid("at least one bracket is required".to_string()));
        };
        if last.up_to.is_some() {
            return Err(invalid("the last bracket must not have an upper bound".to_string()));
        }

        let mut lower = Decimal::ZERO;
        for (index, bracket) in bounded.iter().enumerate() {
            match bracket.up_to {
                None => {
                    return Err(invalid(format!(
                        "bracket {} is open-ended but is not the last bracket",
                        index + 1
                    )));
                }
                Some(up_to) if up_to <= lower => {
                    return Err(invalid(format!(
                        "bracket {} threshold {} is not above {}",
                        index + 1,
                        up_to,
                        lower
                    )));
                }
                Some(up_to) => lower = up_to,
            }
        }

        if let Some(bracket) = self
            .brackets
            .iter()
            .find(|b| b.rate.is_sign_negative() || b.base.is_sign_negative())
        {
            return Err(invalid(format!(
                "negative rate or base in bracket with base {}",
                bracket.base
            )));
        }

        Ok(())
    }

    /// Returns the brackets in ascending order.
    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Computes the unrounded annual tax for an annual income.
    ///
    /// Returns `AmountOutOfRange` if the result does not fit in a `Decimal`.
    pub fn annual_tax(&self, annual_income: Decimal) -> EngineResult<Decimal> {
        let out_of_range = || EngineError::AmountOutOfRange {
            amount: annual_income,
        };

        let mut lower = Decimal::ZERO;
        for bracket in &self.brackets {
            match bracket.up_to {
                Some(up_to) if annual_income > up_to => lower = up_to,
                _ => {
                    let taxable = annual_income
                        .checked_sub(lower)
                        .ok_or_else(out_of_range)?
                        .max(Decimal::ZERO);
                    return bracket
                        .rate
                        .checked_mul(taxable)
                        .and_then(|marginal| bracket.base.checked_add(marginal))
                        .ok_or_else(out_of_range);
                }
            }
        }
        // Unreachable for a validated schedule, whose last bracket is open-ended.
        Ok(Decimal::ZERO)
    }

    /// Computes the monthly tax for a monthly amount, rounded half-up to 2 decimal places.
    ///
    /// The amount must be non-negative; callers validate before calling.
    pub fn monthly_tax(&self, monthly_amount: Decimal) -> EngineResult<Decimal> {
        let months = Decimal::from(MONTHS_PER_YEAR);
        let annual_income =
            monthly_amount
                .checked_mul(months)
                .ok_or(EngineError::AmountOutOfRange {
                    amount: monthly_amount,
                })?;
        Ok(round_money(self.annual_tax(annual_income)? / months))
    }
}

/// Computes the monthly tax on a monthly amount using the default schedule.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_tax;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// // 100,000 a month is 1,200,000 a year: 112,500 + 30% of 200,000 = 172,500.
/// assert_eq!(
///     calculate_tax(Decimal::from_str("100000").unwrap())?,
///     Decimal::from_str("14375.00").unwrap()
/// );
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
pub fn calculate_tax(monthly_gross: Decimal) -> EngineResult<Decimal> {
    TaxSchedule::default().monthly_tax(monthly_gross)
}
