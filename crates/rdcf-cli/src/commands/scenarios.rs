use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use rdcf_core::scenarios::sensitivity::{
    intrinsic_pe_sensitivity, ModelParameter, SensitivityInput, SensitivityOutput,
};
use rdcf_core::types::SensitivityVariable;

use super::{load_reverse_dcf_input, Context, ModelArgs, ObservedArgs};
use crate::input::units::RateUnits;

/// Arguments for intrinsic P/E sensitivity analysis
#[derive(Args)]
pub struct SensitivityArgs {
    /// First sensitivity variable in format name:min:max:step
    /// (e.g. "cost_of_capital:0.08:0.12:0.01")
    #[arg(long)]
    pub var1: String,

    /// Second sensitivity variable (optional, creates a 2D table)
    #[arg(long)]
    pub var2: Option<String>,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Path to JSON file with base case inputs (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Debug, Serialize)]
struct SensitivityReport {
    var1_name: String,
    var2_name: Option<String>,
    base_case_value: Decimal,
    invalid_cells: usize,
    results: Vec<SensitivityRow>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SensitivityRow {
    var1_value: Decimal,
    var2_value: Option<Decimal>,
    /// Empty where the swept inputs are invalid
    intrinsic_pe: Option<Decimal>,
}

/// Parse `name:min:max:step`. Rate bounds follow `units`; year counts never do.
fn parse_sweep_variable(
    arg: &str,
    units: RateUnits,
) -> Result<SensitivityVariable, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = arg.split(':').collect();
    if parts.len() != 4 {
        return Err(format!(
            "Sensitivity variable must be name:min:max:step, got '{}'",
            arg
        )
        .into());
    }

    let param: ModelParameter = parts[0].parse()?;
    let convert = |raw: &str| -> Result<Decimal, Box<dyn std::error::Error>> {
        let value: Decimal = raw.trim().parse()?;
        Ok(if param.is_years() {
            value
        } else {
            units.to_fraction(value)
        })
    };

    Ok(SensitivityVariable {
        name: param.as_str().to_string(),
        min: convert(parts[1])?,
        max: convert(parts[2])?,
        step: convert(parts[3])?,
    })
}

fn flatten(output: &SensitivityOutput, decimals: u32) -> Vec<SensitivityRow> {
    let mut rows = Vec::new();
    for (i, v1) in output.variable_1_values.iter().enumerate() {
        let row = &output.matrix[i];
        if output.variable_2_values.is_empty() {
            rows.push(SensitivityRow {
                var1_value: *v1,
                var2_value: None,
                intrinsic_pe: row[0].map(|pe| pe.round_dp(decimals)),
            });
        } else {
            for (j, v2) in output.variable_2_values.iter().enumerate() {
                rows.push(SensitivityRow {
                    var1_value: *v1,
                    var2_value: Some(*v2),
                    intrinsic_pe: row[j].map(|pe| pe.round_dp(decimals)),
                });
            }
        }
    }
    rows
}

pub fn run_sensitivity(args: SensitivityArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let variable_1 = parse_sweep_variable(&args.var1, ctx.units)?;
    let variable_2 = args
        .var2
        .as_deref()
        .map(|s| parse_sweep_variable(s, ctx.units))
        .transpose()?;

    let base = load_reverse_dcf_input(
        args.input.as_deref(),
        &args.model,
        &ObservedArgs::default(),
        ctx,
    )?
    .model;

    let output = intrinsic_pe_sensitivity(&SensitivityInput {
        base,
        variable_1,
        variable_2,
    })?;

    let sweep = &output.result;
    let report = SensitivityReport {
        var1_name: sweep.variable_1_name.clone(),
        var2_name: sweep.variable_2_name.clone(),
        base_case_value: sweep.base_case_value.round_dp(ctx.decimals),
        invalid_cells: sweep.invalid_cells,
        results: flatten(sweep, ctx.decimals),
        warnings: output.warnings.clone(),
    };
    Ok(serde_json::to_value(report)?)
}
