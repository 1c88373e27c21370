use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use rdcf_core::types::with_metadata;
use rdcf_core::valuation::growth::GrowthPhase;
use rdcf_core::valuation::intrinsic::calculate_intrinsic_pe;
use rdcf_core::valuation::overvaluation::{self, ObservedMultiples, Verdict};
use rdcf_core::valuation::reverse_dcf;
use rdcf_core::valuation::ModelInputs;
use rdcf_core::RdcfResult;

use super::{load_reverse_dcf_input, Context, ModelArgs, ObservedArgs};

/// Arguments for the intrinsic P/E calculation
#[derive(Args)]
pub struct IntrinsicPeArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for printing the year-by-year schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for scoring observed multiples against a known intrinsic P/E
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct OvervaluationArgs {
    /// Intrinsic P/E to compare against
    #[arg(long)]
    pub intrinsic_pe: Decimal,

    /// Current trading P/E
    #[arg(long)]
    pub current_pe: Decimal,

    /// Reference P/E (e.g. last fiscal year)
    #[arg(long, alias = "fy-pe")]
    pub reference_pe: Decimal,
}

/// Arguments for a full valuation against observed multiples
#[derive(Args)]
pub struct ValueArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub observed: ObservedArgs,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Headline numbers of a valuation, rounded for display.
#[derive(Debug, Serialize)]
pub struct ValuationSummary {
    pub intrinsic_pe: Decimal,
    pub effective_pe: Decimal,
    pub overvaluation_pct: Decimal,
    pub verdict: Verdict,
}

#[derive(Debug, Serialize)]
struct ScheduleRow {
    year: u32,
    phase: GrowthPhase,
    growth_rate: Decimal,
    earnings_index: Decimal,
    discount_factor: Decimal,
    present_value: Decimal,
}

pub fn run_intrinsic_pe(args: IntrinsicPeArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let input = load_reverse_dcf_input(
        args.input.as_deref(),
        &args.model,
        &ObservedArgs::default(),
        ctx,
    )?;
    let mut output = reverse_dcf::run_reverse_dcf(&input)?;
    output.result.intrinsic_pe = output.result.intrinsic_pe.round_dp(ctx.decimals);
    output.result.valuation = output.result.valuation.map(|v| v.rounded(ctx.decimals));
    Ok(serde_json::to_value(output)?)
}

pub fn run_schedule(args: ScheduleArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let input = load_reverse_dcf_input(
        args.input.as_deref(),
        &args.model,
        &ObservedArgs::default(),
        ctx,
    )?;
    Ok(serde_json::to_value(schedule_rows(&input.model)?)?)
}

fn schedule_rows(model: &ModelInputs) -> RdcfResult<Vec<ScheduleRow>> {
    let breakdown = calculate_intrinsic_pe(model)?;
    Ok(breakdown
        .trajectory
        .years
        .iter()
        .zip(breakdown.forecast.years.iter())
        .map(|(growth, year)| ScheduleRow {
            year: growth.year,
            phase: growth.phase,
            growth_rate: growth.growth_rate,
            earnings_index: year.earnings_index,
            discount_factor: year.discount_factor,
            present_value: year.present_value,
        })
        .collect())
}

pub fn run_overvaluation(args: OvervaluationArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let observed = ObservedMultiples {
        current_pe: args.current_pe,
        reference_pe: args.reference_pe,
    };
    let result = overvaluation::score(&observed, args.intrinsic_pe)?;
    let rounded = result.rounded(ctx.decimals);

    let summary = ValuationSummary {
        intrinsic_pe: rounded.intrinsic_pe,
        effective_pe: observed.effective_pe(),
        overvaluation_pct: rounded.overvaluation_pct,
        verdict: result.verdict(),
    };
    Ok(serde_json::to_value(summary)?)
}

pub fn run_value(args: ValueArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let input = load_reverse_dcf_input(args.input.as_deref(), &args.model, &args.observed, ctx)?;
    let observed = input
        .observed
        .ok_or("observed multiples required: pass --current-pe and --reference-pe")?;

    let output = reverse_dcf::run_reverse_dcf(&input)?;
    let valuation = output
        .result
        .valuation
        .ok_or("valuation missing from reverse DCF output")?;
    let rounded = valuation.rounded(ctx.decimals);

    let summary = ValuationSummary {
        intrinsic_pe: rounded.intrinsic_pe,
        effective_pe: observed.effective_pe(),
        overvaluation_pct: rounded.overvaluation_pct,
        verdict: valuation.verdict(),
    };

    let enveloped = with_metadata(
        &output.methodology,
        &input,
        output.warnings,
        output.metadata.computation_time_us,
        summary,
    );
    Ok(serde_json::to_value(enveloped)?)
}
