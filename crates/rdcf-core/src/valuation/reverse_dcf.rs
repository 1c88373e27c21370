use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::compounding::CompoundedYear;
use super::growth::GrowthYear;
use super::inputs::ModelInputs;
use super::intrinsic::{calculate_intrinsic_pe, IntrinsicPeBreakdown};
use super::overvaluation::{score, ObservedMultiples, ValuationResult};
use crate::types::{with_metadata, ComputationOutput, Multiple, Rate};
use crate::RdcfResult;

/// Terminal share of pre-tax value above which a warning is attached.
const TERMINAL_SHARE_WARNING: Decimal = dec!(0.75);

/// Intrinsic multiples above this are flagged as implausible (not clamped).
const HIGH_MULTIPLE_WARNING: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a full reverse-DCF run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseDcfInput {
    pub model: ModelInputs,
    /// When present, the run also scores the market against the intrinsic P/E.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<ObservedMultiples>,
}

/// Output of a full reverse-DCF run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseDcfOutput {
    /// Year-by-year growth rates
    pub growth_schedule: Vec<GrowthYear>,
    /// Year-by-year earnings index and present value
    pub projections: Vec<CompoundedYear>,
    pub fade_step: Rate,
    pub forecast_pv: Decimal,
    pub terminal_pv: Decimal,
    /// Terminal PV as a fraction of pre-tax value
    pub terminal_value_pct: Rate,
    pub pre_tax_value: Decimal,
    pub intrinsic_pe: Multiple,
    /// Lower of the two observed multiples, when supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_pe: Option<Multiple>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valuation: Option<ValuationResult>,
    /// Echoed for display; not used by the model
    pub roce: Rate,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Three-phase reverse DCF: growth schedule, discounting, Gordon terminal
/// value, tax adjustment, and (optionally) the overvaluation score.
pub fn run_reverse_dcf(
    input: &ReverseDcfInput,
) -> RdcfResult<ComputationOutput<ReverseDcfOutput>> {
    let start = Instant::now();

    let breakdown = calculate_intrinsic_pe(&input.model)?;
    let warnings = collect_warnings(&input.model, &breakdown);

    let valuation = match input.observed {
        Some(ref observed) => Some(score(observed, breakdown.intrinsic_pe)?),
        None => None,
    };

    let terminal_value_pct = breakdown.terminal_value_share();
    let IntrinsicPeBreakdown {
        trajectory,
        forecast,
        terminal_pv,
        pre_tax_value,
        intrinsic_pe,
    } = breakdown;

    let output = ReverseDcfOutput {
        growth_schedule: trajectory.years,
        projections: forecast.years,
        fade_step: trajectory.fade_step,
        forecast_pv: forecast.forecast_pv,
        terminal_pv,
        terminal_value_pct,
        pre_tax_value,
        intrinsic_pe,
        effective_pe: input.observed.as_ref().map(ObservedMultiples::effective_pe),
        valuation,
        roce: input.model.roce,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Three-Phase Reverse DCF (high growth, linear fade, Gordon terminal)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Intrinsic P/E and overvaluation for one set of inputs, without the envelope.
pub fn evaluate(model: &ModelInputs, observed: &ObservedMultiples) -> RdcfResult<ValuationResult> {
    let breakdown = calculate_intrinsic_pe(model)?;
    score(observed, breakdown.intrinsic_pe)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn collect_warnings(model: &ModelInputs, breakdown: &IntrinsicPeBreakdown) -> Vec<String> {
    let mut warnings = Vec::new();

    let share = breakdown.terminal_value_share();
    if share > TERMINAL_SHARE_WARNING {
        warnings.push(format!(
            "Terminal value represents {:.1}% of pre-tax value; the result is dominated by the perpetuity assumption",
            share * dec!(100)
        ));
    }

    if model.high_growth_rate < model.terminal_growth_rate {
        warnings.push(format!(
            "High growth rate ({}) is below terminal growth rate ({}); growth rises during the fade phase",
            model.high_growth_rate, model.terminal_growth_rate
        ));
    }

    if breakdown.intrinsic_pe > HIGH_MULTIPLE_WARNING {
        warnings.push(format!(
            "Intrinsic P/E of {:.1}x is unusually high; review growth and discount assumptions",
            breakdown.intrinsic_pe
        ));
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RdcfError;
    use rust_decimal_macros::dec;

    fn sample_input() -> ReverseDcfInput {
        ReverseDcfInput {
            model: ModelInputs {
                cost_of_capital: dec!(0.10),
                roce: dec!(0.20),
                high_growth_rate: dec!(0.15),
                high_growth_years: 5,
                fade_years: 5,
                terminal_growth_rate: dec!(0.02),
                tax_rate: dec!(0.25),
            },
            observed: Some(ObservedMultiples {
                current_pe: dec!(45),
                reference_pe: dec!(40),
            }),
        }
    }

    #[test]
    fn test_full_run() {
        let result = run_reverse_dcf(&sample_input()).unwrap();
        let out = &result.result;

        assert_eq!(out.growth_schedule.len(), 10);
        assert_eq!(out.projections.len(), 10);
        assert_eq!(out.effective_pe, Some(dec!(40)));
        assert_eq!(out.roce, dec!(0.20));

        let valuation = out.valuation.unwrap();
        assert_eq!(valuation.intrinsic_pe, out.intrinsic_pe);
        // 40 / ~19.31 - 1 ~ +107%
        assert!(valuation.overvaluation_pct > dec!(100));
        assert!(valuation.overvaluation_pct < dec!(110));
    }

    #[test]
    fn test_without_observed_multiples() {
        let mut input = sample_input();
        input.observed = None;
        let result = run_reverse_dcf(&input).unwrap();
        assert!(result.result.valuation.is_none());
        assert!(result.result.effective_pe.is_none());
    }

    #[test]
    fn test_methodology_and_assumptions() {
        let result = run_reverse_dcf(&sample_input()).unwrap();
        assert_eq!(
            result.methodology,
            "Three-Phase Reverse DCF (high growth, linear fade, Gordon terminal)"
        );
        assert!(result.assumptions.get("model").is_some());
    }

    #[test]
    fn test_terminal_heavy_warning() {
        let mut input = sample_input();
        input.model.high_growth_years = 1;
        input.model.fade_years = 1;
        input.model.terminal_growth_rate = dec!(0.08);
        let result = run_reverse_dcf(&input).unwrap();
        assert!(result
            .warnings
            .iter()
            .any(|w| w.starts_with("Terminal value represents")));
    }

    #[test]
    fn test_rising_fade_warning() {
        let mut input = sample_input();
        input.model.high_growth_rate = dec!(0.01);
        let result = run_reverse_dcf(&input).unwrap();
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("growth rises during the fade phase")));
    }

    #[test]
    fn test_invalid_observed_fails_whole_run() {
        let mut input = sample_input();
        input.observed = Some(ObservedMultiples {
            current_pe: dec!(-5),
            reference_pe: dec!(40),
        });
        assert!(matches!(
            run_reverse_dcf(&input),
            Err(RdcfError::InvalidModelInput { .. })
        ));
    }

    #[test]
    fn test_evaluate_matches_full_run() {
        let input = sample_input();
        let full = run_reverse_dcf(&input).unwrap();
        let quick = evaluate(&input.model, &input.observed.unwrap()).unwrap();
        assert_eq!(Some(quick), full.result.valuation);
    }
}
