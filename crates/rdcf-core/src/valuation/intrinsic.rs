use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::compounding::{compound_trajectory, CompoundedForecast};
use super::growth::GrowthTrajectory;
use super::inputs::{validate_tax_rate, ModelInputs};
use super::terminal::terminal_value_for;
use crate::error::RdcfError;
use crate::types::{Multiple, Rate};
use crate::RdcfResult;

/// Every intermediate of an intrinsic P/E computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrinsicPeBreakdown {
    pub trajectory: GrowthTrajectory,
    pub forecast: CompoundedForecast,
    pub terminal_pv: Decimal,
    /// forecast PV + terminal PV, before the tax adjustment
    pub pre_tax_value: Decimal,
    pub intrinsic_pe: Multiple,
}

impl IntrinsicPeBreakdown {
    /// Share of pre-tax value contributed by the terminal phase, as a fraction.
    pub fn terminal_value_share(&self) -> Rate {
        if self.pre_tax_value.is_zero() {
            Decimal::ZERO
        } else {
            self.terminal_pv / self.pre_tax_value
        }
    }
}

/// `(forecast_pv + terminal_pv) * (1 - tax_rate)`
pub fn intrinsic_multiple(
    forecast_pv: Decimal,
    terminal_pv: Decimal,
    tax_rate: Rate,
) -> RdcfResult<Multiple> {
    validate_tax_rate(tax_rate)?;
    let pre_tax = forecast_pv
        .checked_add(terminal_pv)
        .ok_or_else(|| RdcfError::Overflow {
            context: "pre-tax value".into(),
        })?;
    Ok(pre_tax * (Decimal::ONE - tax_rate))
}

/// Run the full pipeline and keep every intermediate.
pub fn calculate_intrinsic_pe(inputs: &ModelInputs) -> RdcfResult<IntrinsicPeBreakdown> {
    inputs.validate()?;

    let trajectory = GrowthTrajectory::from_inputs(inputs)?;
    let forecast = compound_trajectory(&trajectory, inputs.cost_of_capital)?;
    let terminal_pv = terminal_value_for(
        &forecast,
        inputs.cost_of_capital,
        inputs.terminal_growth_rate,
    )?;
    let intrinsic_pe = intrinsic_multiple(forecast.forecast_pv, terminal_pv, inputs.tax_rate)?;
    let pre_tax_value = forecast
        .forecast_pv
        .checked_add(terminal_pv)
        .ok_or_else(|| RdcfError::Overflow {
            context: "pre-tax value".into(),
        })?;

    tracing::debug!(
        forecast_pv = %forecast.forecast_pv,
        %terminal_pv,
        %intrinsic_pe,
        "computed intrinsic multiple"
    );

    Ok(IntrinsicPeBreakdown {
        trajectory,
        forecast,
        terminal_pv,
        pre_tax_value,
        intrinsic_pe,
    })
}

/// Intrinsic P/E only.
pub fn intrinsic_pe(inputs: &ModelInputs) -> RdcfResult<Multiple> {
    calculate_intrinsic_pe(inputs).map(|b| b.intrinsic_pe)
}
