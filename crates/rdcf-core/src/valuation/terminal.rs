use rust_decimal::Decimal;

use super::compounding::CompoundedForecast;
use crate::error::RdcfError;
use crate::time_value::perpetuity_growth_factor;
use crate::types::Rate;
use crate::RdcfResult;

/// Present value of every year past the forecast horizon, Gordon growth form:
///
/// `TerminalPV = D_N * E_N * (1 + g) / (r - g)`
pub fn terminal_present_value(
    final_earnings_index: Decimal,
    final_discount_factor: Decimal,
    cost_of_capital: Rate,
    terminal_growth_rate: Rate,
) -> RdcfResult<Decimal> {
    let multiplier = perpetuity_growth_factor(cost_of_capital, terminal_growth_rate)?;
    final_discount_factor
        .checked_mul(final_earnings_index)
        .and_then(|v| v.checked_mul(multiplier))
        .ok_or_else(|| RdcfError::Overflow {
            context: "terminal value".into(),
        })
}

/// Terminal PV for a compounded forecast.
pub fn terminal_value_for(
    forecast: &CompoundedForecast,
    cost_of_capital: Rate,
    terminal_growth_rate: Rate,
) -> RdcfResult<Decimal> {
    terminal_present_value(
        forecast.final_earnings_index,
        forecast.final_discount_factor,
        cost_of_capital,
        terminal_growth_rate,
    )
}
