pub mod company;
pub mod scenarios;
pub mod valuation;

use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rdcf_core::valuation::reverse_dcf::ReverseDcfInput;
use rdcf_core::valuation::{ModelInputs, ObservedMultiples};

use crate::config::Config;
use crate::input;
use crate::input::units::RateUnits;

/// Settings shared by every command.
pub struct Context {
    pub config: Config,
    pub units: RateUnits,
    /// Decimal places for displayed multiples and percentages
    pub decimals: u32,
}

/// Model parameters. Unset flags fall back to the `[model]` config section.
#[derive(Args, Debug, Clone, Default)]
#[command(allow_hyphen_values = true)]
pub struct ModelArgs {
    /// Cost of capital / discount rate (e.g. 0.10 for 10%)
    #[arg(long, alias = "coc")]
    pub cost_of_capital: Option<Decimal>,

    /// Return on capital employed (display only)
    #[arg(long)]
    pub roce: Option<Decimal>,

    /// Earnings growth during the high-growth phase
    #[arg(long, alias = "growth")]
    pub high_growth_rate: Option<Decimal>,

    /// Length of the high-growth phase in years
    #[arg(long, alias = "growth-period")]
    pub high_growth_years: Option<u32>,

    /// Years over which growth fades to the terminal rate
    #[arg(long, alias = "fade-period")]
    pub fade_years: Option<u32>,

    /// Perpetual growth rate after the fade
    #[arg(long, alias = "terminal-growth")]
    pub terminal_growth_rate: Option<Decimal>,

    /// Tax rate applied to pre-tax earning power
    #[arg(long)]
    pub tax_rate: Option<Decimal>,
}

impl ModelArgs {
    /// Build engine inputs, converting percentage flags to fractions.
    pub fn resolve(&self, ctx: &Context) -> ModelInputs {
        let d = &ctx.config.model;
        let rate = |flag: Option<Decimal>, default: Decimal| {
            flag.map(|v| ctx.units.to_fraction(v)).unwrap_or(default)
        };
        ModelInputs {
            cost_of_capital: rate(self.cost_of_capital, d.cost_of_capital),
            roce: rate(self.roce, d.roce),
            high_growth_rate: rate(self.high_growth_rate, d.high_growth_rate),
            high_growth_years: self.high_growth_years.unwrap_or(d.high_growth_years),
            fade_years: self.fade_years.unwrap_or(d.fade_years),
            terminal_growth_rate: rate(self.terminal_growth_rate, d.terminal_growth_rate),
            tax_rate: rate(self.tax_rate, d.tax_rate),
        }
    }
}

/// Observed market multiples given on the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct ObservedArgs {
    /// Current trading P/E
    #[arg(long)]
    pub current_pe: Option<Decimal>,

    /// Reference P/E (e.g. last fiscal year)
    #[arg(long, alias = "fy-pe")]
    pub reference_pe: Option<Decimal>,
}

impl ObservedArgs {
    pub fn resolve(&self) -> Result<Option<ObservedMultiples>, Box<dyn std::error::Error>> {
        match (self.current_pe, self.reference_pe) {
            (Some(current_pe), Some(reference_pe)) => Ok(Some(ObservedMultiples {
                current_pe,
                reference_pe,
            })),
            (None, None) => Ok(None),
            _ => Err("--current-pe and --reference-pe must be given together".into()),
        }
    }
}

/// Accepts either a bare `ModelInputs` object or a `{model, observed}` object.
fn parse_reverse_dcf_input(value: Value) -> Result<ReverseDcfInput, Box<dyn std::error::Error>> {
    if value.get("model").is_some() {
        Ok(serde_json::from_value(value)?)
    } else {
        Ok(ReverseDcfInput {
            model: serde_json::from_value(value)?,
            observed: None,
        })
    }
}

/// Resolve a run's input from `--input`, piped stdin, or flags (in that order).
pub fn load_reverse_dcf_input(
    path: Option<&str>,
    model: &ModelArgs,
    observed: &ObservedArgs,
    ctx: &Context,
) -> Result<ReverseDcfInput, Box<dyn std::error::Error>> {
    let source = match path {
        Some(path) => Some(input::file::read_json_value(path)?),
        None => input::stdin::read_stdin()?,
    };
    build_reverse_dcf_input(source, model, observed, ctx)
}

/// Observed-multiple flags override whatever the JSON carried.
fn build_reverse_dcf_input(
    source: Option<Value>,
    model: &ModelArgs,
    observed: &ObservedArgs,
    ctx: &Context,
) -> Result<ReverseDcfInput, Box<dyn std::error::Error>> {
    let mut input = match source {
        Some(data) => parse_reverse_dcf_input(data)?,
        None => ReverseDcfInput {
            model: model.resolve(ctx),
            observed: None,
        },
    };

    if let Some(flags) = observed.resolve()? {
        input.observed = Some(flags);
    }

    tracing::debug!(model = ?input.model, observed = input.observed.is_some(), "resolved model input");
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ctx(units: RateUnits) -> Context {
        Context {
            config: Config::default(),
            units,
            decimals: 2,
        }
    }

    #[test]
    fn test_flags_fall_back_to_config() {
        let args = ModelArgs {
            cost_of_capital: Some(dec!(0.12)),
            ..ModelArgs::default()
        };
        let inputs = args.resolve(&ctx(RateUnits::Fraction));
        assert_eq!(inputs.cost_of_capital, dec!(0.12));
        assert_eq!(inputs.high_growth_years, 15);
        assert_eq!(inputs.terminal_growth_rate, dec!(0.02));
    }

    #[test]
    fn test_percent_flags_converted() {
        let args = ModelArgs {
            cost_of_capital: Some(dec!(11)),
            high_growth_rate: Some(dec!(18)),
            fade_years: Some(10),
            ..ModelArgs::default()
        };
        let inputs = args.resolve(&ctx(RateUnits::Percent));
        assert_eq!(inputs.cost_of_capital, dec!(0.11));
        assert_eq!(inputs.high_growth_rate, dec!(0.18));
        assert_eq!(inputs.fade_years, 10);
        // defaults are already fractions and stay untouched
        assert_eq!(inputs.tax_rate, dec!(0.25));
    }

    #[test]
    fn test_observed_flags_must_pair() {
        let only_current = ObservedArgs {
            current_pe: Some(dec!(20)),
            reference_pe: None,
        };
        assert!(only_current.resolve().is_err());
        assert!(ObservedArgs::default().resolve().unwrap().is_none());
    }

    #[test]
    fn test_parse_bare_model_json() {
        let value = serde_json::json!({
            "cost_of_capital": "0.10",
            "roce": "0.20",
            "high_growth_rate": "0.15",
            "high_growth_years": 5,
            "fade_years": 5,
            "terminal_growth_rate": "0.02",
            "tax_rate": "0.25"
        });
        let input = parse_reverse_dcf_input(value).unwrap();
        assert_eq!(input.model.fade_years, 5);
        assert!(input.observed.is_none());
    }

    #[test]
    fn test_observed_flags_override_json() {
        let value = serde_json::json!({
            "model": {
                "cost_of_capital": "0.10",
                "roce": "0.20",
                "high_growth_rate": "0.15",
                "high_growth_years": 5,
                "fade_years": 5,
                "terminal_growth_rate": "0.02",
                "tax_rate": "0.25"
            },
            "observed": { "current_pe": "25", "reference_pe": "30" }
        });
        let flags = ObservedArgs {
            current_pe: Some(dec!(12)),
            reference_pe: Some(dec!(14)),
        };
        let input = build_reverse_dcf_input(
            Some(value),
            &ModelArgs::default(),
            &flags,
            &ctx(RateUnits::Fraction),
        )
        .unwrap();
        assert_eq!(input.observed.unwrap().effective_pe(), dec!(12));
    }

    #[test]
    fn test_no_source_uses_flags() {
        let input = build_reverse_dcf_input(
            None,
            &ModelArgs {
                fade_years: Some(3),
                ..ModelArgs::default()
            },
            &ObservedArgs::default(),
            &ctx(RateUnits::Fraction),
        )
        .unwrap();
        assert_eq!(input.model.fade_years, 3);
        assert!(input.observed.is_none());
    }
}
