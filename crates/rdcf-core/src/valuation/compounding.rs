use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::growth::GrowthTrajectory;
use super::inputs::validate_cost_of_capital;
use crate::error::RdcfError;
use crate::time_value::{compound, discount_factor, present_value};
use crate::types::Rate;
use crate::RdcfResult;

/// Earnings index and its present value for one forecast year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundedYear {
    pub year: u32,
    pub growth_rate: Rate,
    /// Cumulative product of (1 + g) up to and including this year; 1 at year 0.
    pub earnings_index: Decimal,
    /// (1 + cost_of_capital)^-year
    pub discount_factor: Decimal,
    /// earnings_index / (1 + cost_of_capital)^year
    pub present_value: Decimal,
}

/// Discounted earnings stream over the explicit forecast horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundedForecast {
    pub years: Vec<CompoundedYear>,
    /// Sum of every forecast year's present value
    pub forecast_pv: Decimal,
    /// Earnings index in the final forecast year (E_N)
    pub final_earnings_index: Decimal,
    /// (1 + cost_of_capital)^-N
    pub final_discount_factor: Decimal,
}

/// Compound a growth schedule into an earnings index and discount it at
/// `cost_of_capital`, annually compounded.
pub fn compound_trajectory(
    trajectory: &GrowthTrajectory,
    cost_of_capital: Rate,
) -> RdcfResult<CompoundedForecast> {
    validate_cost_of_capital(cost_of_capital)?;
    if trajectory.years.is_empty() {
        return Err(RdcfError::InsufficientData(
            "Growth trajectory has no forecast years".into(),
        ));
    }

    let mut years = Vec::with_capacity(trajectory.years.len());
    let mut earnings_index = Decimal::ONE;
    let mut forecast_pv = Decimal::ZERO;

    for entry in &trajectory.years {
        earnings_index = compound(earnings_index, entry.growth_rate)?;
        let pv = present_value(earnings_index, cost_of_capital, entry.year)?;
        forecast_pv = forecast_pv
            .checked_add(pv)
            .ok_or_else(|| RdcfError::Overflow {
                context: format!("forecast PV at year {}", entry.year),
            })?;

        years.push(CompoundedYear {
            year: entry.year,
            growth_rate: entry.growth_rate,
            earnings_index,
            discount_factor: discount_factor(cost_of_capital, entry.year)?,
            present_value: pv,
        });
    }

    let final_discount_factor = discount_factor(cost_of_capital, trajectory.horizon())?;

    Ok(CompoundedForecast {
        years,
        forecast_pv,
        final_earnings_index: earnings_index,
        final_discount_factor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::growth::build_growth_schedule;
    use rust_decimal_macros::dec;

    fn approx_eq(a: Decimal, b: Decimal, eps: Decimal) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_earnings_index_is_cumulative_product() {
        let t = build_growth_schedule(dec!(0.10), 2, 1, dec!(0.00)).unwrap();
        let f = compound_trajectory(&t, dec!(0.10)).unwrap();
        assert_eq!(f.years[0].earnings_index, dec!(1.10));
        assert_eq!(f.years[1].earnings_index, dec!(1.21));
        // fade year lands on 0% growth
        assert_eq!(f.years[2].earnings_index, dec!(1.21));
        assert_eq!(f.final_earnings_index, dec!(1.21));
    }

    #[test]
    fn test_growth_equal_to_discount_gives_unit_pvs() {
        let t = build_growth_schedule(dec!(0.10), 3, 2, dec!(0.10)).unwrap();
        let f = compound_trajectory(&t, dec!(0.10)).unwrap();
        for y in &f.years {
            assert!(approx_eq(y.present_value, Decimal::ONE, dec!(0.0000000001)));
        }
        assert!(approx_eq(f.forecast_pv, dec!(5), dec!(0.000000001)));
    }

    #[test]
    fn test_final_discount_factor() {
        let t = build_growth_schedule(dec!(0.15), 5, 5, dec!(0.02)).unwrap();
        let f = compound_trajectory(&t, dec!(0.10)).unwrap();
        // 1.1^-10 = 0.385543...
        assert!(approx_eq(
            f.final_discount_factor,
            dec!(0.3855432894295314),
            dec!(0.0000000001)
        ));
        assert_eq!(
            f.final_discount_factor,
            f.years.last().unwrap().discount_factor
        );
    }

    #[test]
    fn test_zero_cost_of_capital_rejected() {
        let t = build_growth_schedule(dec!(0.15), 5, 5, dec!(0.02)).unwrap();
        assert!(matches!(
            compound_trajectory(&t, Decimal::ZERO),
            Err(RdcfError::InvalidModelInput { .. })
        ));
    }
}
