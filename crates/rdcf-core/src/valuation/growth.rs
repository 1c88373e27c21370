//! Year-by-year earnings growth schedule.
//!
//! Three phases:
//! 1. High growth: a constant rate for `high_growth_years`.
//! 2. Fade: the rate steps down linearly over `fade_years`, landing exactly on
//!    the terminal rate in the final fade year.
//! 3. Terminal: the terminal rate forever. Not materialised; see
//!    [`GrowthTrajectory::rate_for_year`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::inputs::{validate_durations, validate_growth_rate, ModelInputs};
use crate::error::RdcfError;
use crate::types::Rate;
use crate::RdcfResult;

/// Which part of the forecast a year belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPhase {
    HighGrowth,
    Fade,
    Terminal,
}

/// Growth rate applied in a single forecast year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthYear {
    /// Year number (1-indexed).
    pub year: u32,
    pub phase: GrowthPhase,
    pub growth_rate: Rate,
}

/// Explicit growth schedule followed by a constant terminal tail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthTrajectory {
    pub years: Vec<GrowthYear>,
    /// Per-year decrement applied during the fade phase (negative when growth rises).
    pub fade_step: Rate,
    pub terminal_growth_rate: Rate,
}

impl GrowthTrajectory {
    /// Build the schedule for a full set of model inputs.
    pub fn from_inputs(inputs: &ModelInputs) -> RdcfResult<Self> {
        build_growth_schedule(
            inputs.high_growth_rate,
            inputs.high_growth_years,
            inputs.fade_years,
            inputs.terminal_growth_rate,
        )
    }

    /// Last explicitly forecast year (0 when empty).
    pub fn horizon(&self) -> u32 {
        self.years.iter().map(|y| y.year).max().unwrap_or(0)
    }

    fn entry(&self, year: u32) -> Option<&GrowthYear> {
        // Built schedules are contiguous from year 1; hand-built ones may not be.
        year.checked_sub(1)
            .and_then(|i| self.years.get(i as usize))
            .filter(|y| y.year == year)
            .or_else(|| self.years.iter().find(|y| y.year == year))
    }

    /// Growth rate for any year >= 1, including years past the horizon.
    /// `None` for year 0 and for gaps inside the explicit schedule.
    pub fn rate_for_year(&self, year: u32) -> Option<Rate> {
        match year {
            0 => None,
            y if y > self.horizon() => Some(self.terminal_growth_rate),
            y => self.entry(y).map(|e| e.growth_rate),
        }
    }

    pub fn phase_for_year(&self, year: u32) -> Option<GrowthPhase> {
        match year {
            0 => None,
            y if y > self.horizon() => Some(GrowthPhase::Terminal),
            y => self.entry(y).map(|e| e.phase),
        }
    }
}

/// Derive the growth rate applicable to every explicit forecast year.
pub fn build_growth_schedule(
    high_growth_rate: Rate,
    high_growth_years: u32,
    fade_years: u32,
    terminal_growth_rate: Rate,
) -> RdcfResult<GrowthTrajectory> {
    validate_durations(high_growth_years, fade_years)?;
    validate_growth_rate("high_growth_rate", high_growth_rate)?;
    validate_growth_rate("terminal_growth_rate", terminal_growth_rate)?;

    let fade_step = high_growth_rate
        .checked_sub(terminal_growth_rate)
        .and_then(|gap| gap.checked_div(Decimal::from(fade_years)))
        .ok_or_else(|| RdcfError::Overflow {
            context: format!("fade step from {high_growth_rate} to {terminal_growth_rate}"),
        })?;

    let mut years = Vec::with_capacity((high_growth_years + fade_years) as usize);
    for year in 1..=high_growth_years {
        years.push(GrowthYear {
            year,
            phase: GrowthPhase::HighGrowth,
            growth_rate: high_growth_rate,
        });
    }

    for k in 1..=fade_years {
        // Pinned so decimal rounding in the step cannot leave the last year short.
        let growth_rate = if k == fade_years {
            terminal_growth_rate
        } else {
            fade_step
                .checked_mul(Decimal::from(k))
                .and_then(|faded| high_growth_rate.checked_sub(faded))
                .ok_or_else(|| RdcfError::Overflow {
                    context: format!("fade rate in year {}", high_growth_years + k),
                })?
        };
        years.push(GrowthYear {
            year: high_growth_years + k,
            phase: GrowthPhase::Fade,
            growth_rate,
        });
    }

    tracing::trace!(
        horizon = years.len(),
        %fade_step,
        "built growth schedule"
    );

    Ok(GrowthTrajectory {
        years,
        fade_step,
        terminal_growth_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_schedule_length_and_phases() {
        let t = build_growth_schedule(dec!(0.15), 5, 5, dec!(0.02)).unwrap();
        assert_eq!(t.horizon(), 10);
        assert!(t.years[..5].iter().all(|y| y.phase == GrowthPhase::HighGrowth));
        assert!(t.years[5..].iter().all(|y| y.phase == GrowthPhase::Fade));
        assert_eq!(t.phase_for_year(11), Some(GrowthPhase::Terminal));
    }

    #[test]
    fn test_fade_is_linear() {
        // step = (0.15 - 0.02) / 5 = 0.026
        let t = build_growth_schedule(dec!(0.15), 5, 5, dec!(0.02)).unwrap();
        assert_eq!(t.fade_step, dec!(0.026));
        let fade: Vec<Rate> = t.years[5..].iter().map(|y| y.growth_rate).collect();
        assert_eq!(
            fade,
            vec![dec!(0.124), dec!(0.098), dec!(0.072), dec!(0.046), dec!(0.02)]
        );
    }

    #[test]
    fn test_last_fade_year_hits_terminal_exactly() {
        // 0.13 / 3 does not terminate in decimal
        let t = build_growth_schedule(dec!(0.15), 4, 3, dec!(0.02)).unwrap();
        assert_eq!(t.rate_for_year(7), Some(dec!(0.02)));
        assert_eq!(t.rate_for_year(4), Some(dec!(0.15)));
    }

    #[test]
    fn test_rising_fade_when_terminal_above_high() {
        let t = build_growth_schedule(dec!(0.01), 2, 2, dec!(0.03)).unwrap();
        assert_eq!(t.rate_for_year(3), Some(dec!(0.02)));
        assert_eq!(t.rate_for_year(4), Some(dec!(0.03)));
    }

    #[test]
    fn test_terminal_tail_beyond_horizon() {
        let t = build_growth_schedule(dec!(0.20), 1, 1, dec!(0.03)).unwrap();
        assert_eq!(t.rate_for_year(0), None);
        assert_eq!(t.rate_for_year(500), Some(dec!(0.03)));
    }

    #[test]
    fn test_lookup_tolerates_hand_built_gaps() {
        let json = r#"{
            "years": [
                { "year": 2, "phase": "high_growth", "growth_rate": "0.12" },
                { "year": 4, "phase": "fade", "growth_rate": "0.05" }
            ],
            "fade_step": "0.07",
            "terminal_growth_rate": "0.03"
        }"#;
        let t: GrowthTrajectory = serde_json::from_str(json).unwrap();
        assert_eq!(t.horizon(), 4);
        assert_eq!(t.rate_for_year(1), None);
        assert_eq!(t.rate_for_year(2), Some(dec!(0.12)));
        assert_eq!(t.phase_for_year(3), None);
        assert_eq!(t.phase_for_year(4), Some(GrowthPhase::Fade));
        assert_eq!(t.rate_for_year(5), Some(dec!(0.03)));

        let empty = GrowthTrajectory {
            years: Vec::new(),
            fade_step: Decimal::ZERO,
            terminal_growth_rate: dec!(0.02),
        };
        assert_eq!(empty.rate_for_year(1), Some(dec!(0.02)));
    }

    #[test]
    fn test_unrepresentable_fade_is_overflow() {
        let result = build_growth_schedule(Decimal::MAX, 5, 5, dec!(-0.5));
        assert!(matches!(result, Err(RdcfError::Overflow { .. })));
    }

    #[test]
    fn test_zero_fade_years_rejected() {
        let result = build_growth_schedule(dec!(0.15), 5, 0, dec!(0.02));
        assert!(matches!(
            result,
            Err(RdcfError::InvalidModelInput { ref field, .. }) if field == "fade_years"
        ));
    }
}
