use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RdcfError;
use crate::types::Rate;
use crate::RdcfResult;

/// Longest explicit forecast horizon accepted (high-growth + fade years).
pub const MAX_HORIZON_YEARS: u32 = 200;

/// Assumptions for one reverse-DCF run. All rates are fractions (0.10 = 10%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInputs {
    /// Discount rate applied to every future year
    pub cost_of_capital: Rate,
    /// Pre-tax return on capital employed. Reported alongside results only.
    pub roce: Rate,
    /// Earnings growth during the high-growth phase
    pub high_growth_rate: Rate,
    /// Length of the high-growth phase
    pub high_growth_years: u32,
    /// Years over which growth fades linearly to the terminal rate
    pub fade_years: u32,
    /// Perpetual growth after the fade phase
    pub terminal_growth_rate: Rate,
    /// Tax rate converting pre-tax earning power into a post-tax multiple
    pub tax_rate: Rate,
}

impl ModelInputs {
    /// Total number of explicitly forecast years.
    pub fn horizon_years(&self) -> u32 {
        self.high_growth_years.saturating_add(self.fade_years)
    }

    /// Check every invariant the engine relies on.
    pub fn validate(&self) -> RdcfResult<()> {
        validate_durations(self.high_growth_years, self.fade_years)?;
        validate_cost_of_capital(self.cost_of_capital)?;
        validate_growth_rate("high_growth_rate", self.high_growth_rate)?;
        validate_growth_rate("terminal_growth_rate", self.terminal_growth_rate)?;
        validate_terminal_spread(self.cost_of_capital, self.terminal_growth_rate)?;
        validate_tax_rate(self.tax_rate)?;
        Ok(())
    }
}

pub(crate) fn validate_durations(high_growth_years: u32, fade_years: u32) -> RdcfResult<()> {
    if high_growth_years == 0 {
        return Err(RdcfError::invalid(
            "high_growth_years",
            high_growth_years,
            "High-growth phase must last at least one year",
        ));
    }
    if fade_years == 0 {
        return Err(RdcfError::invalid(
            "fade_years",
            fade_years,
            "Fade phase must last at least one year",
        ));
    }
    let total = high_growth_years.saturating_add(fade_years);
    if total > MAX_HORIZON_YEARS {
        return Err(RdcfError::invalid(
            "horizon_years",
            total,
            "Total forecast horizon exceeds 200 years",
        ));
    }
    Ok(())
}

pub(crate) fn validate_cost_of_capital(cost_of_capital: Rate) -> RdcfResult<()> {
    if cost_of_capital <= Decimal::ZERO {
        return Err(RdcfError::invalid(
            "cost_of_capital",
            cost_of_capital,
            "Cost of capital must be positive; undiscounted compounding is not supported",
        ));
    }
    Ok(())
}

pub(crate) fn validate_growth_rate(field: &str, rate: Rate) -> RdcfResult<()> {
    if rate <= dec!(-1) {
        return Err(RdcfError::invalid(
            field,
            rate,
            "Growth rate must be greater than -100%",
        ));
    }
    Ok(())
}

pub(crate) fn validate_terminal_spread(cost_of_capital: Rate, terminal_growth_rate: Rate) -> RdcfResult<()> {
    if terminal_growth_rate >= cost_of_capital {
        return Err(RdcfError::invalid(
            "terminal_growth_rate",
            terminal_growth_rate,
            "terminal growth must be strictly below the discount rate",
        ));
    }
    Ok(())
}

pub(crate) fn validate_tax_rate(tax_rate: Rate) -> RdcfResult<()> {
    if tax_rate < Decimal::ZERO || tax_rate >= Decimal::ONE {
        return Err(RdcfError::invalid(
            "tax_rate",
            tax_rate,
            "Tax rate must be in [0, 1)",
        ));
    }
    Ok(())
}
