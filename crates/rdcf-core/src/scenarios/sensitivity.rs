use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::error::RdcfError;
use crate::types::*;
use crate::valuation::intrinsic::intrinsic_pe;
use crate::valuation::ModelInputs;
use crate::RdcfResult;

/// Upper bound on points per sweep axis.
const MAX_SWEEP_POINTS: usize = 500;

/// A model input that can be swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelParameter {
    CostOfCapital,
    HighGrowthRate,
    HighGrowthYears,
    FadeYears,
    TerminalGrowthRate,
    TaxRate,
}

impl ModelParameter {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelParameter::CostOfCapital => "cost_of_capital",
            ModelParameter::HighGrowthRate => "high_growth_rate",
            ModelParameter::HighGrowthYears => "high_growth_years",
            ModelParameter::FadeYears => "fade_years",
            ModelParameter::TerminalGrowthRate => "terminal_growth_rate",
            ModelParameter::TaxRate => "tax_rate",
        }
    }

    pub fn is_years(&self) -> bool {
        matches!(self, ModelParameter::HighGrowthYears | ModelParameter::FadeYears)
    }

    /// Current value of this parameter in `inputs`.
    pub fn get(&self, inputs: &ModelInputs) -> Decimal {
        match self {
            ModelParameter::CostOfCapital => inputs.cost_of_capital,
            ModelParameter::HighGrowthRate => inputs.high_growth_rate,
            ModelParameter::HighGrowthYears => Decimal::from(inputs.high_growth_years),
            ModelParameter::FadeYears => Decimal::from(inputs.fade_years),
            ModelParameter::TerminalGrowthRate => inputs.terminal_growth_rate,
            ModelParameter::TaxRate => inputs.tax_rate,
        }
    }

    /// Overwrite this parameter in `inputs`. Year counts must be whole numbers.
    pub fn set(&self, inputs: &mut ModelInputs, value: Decimal) -> RdcfResult<()> {
        match self {
            ModelParameter::CostOfCapital => inputs.cost_of_capital = value,
            ModelParameter::HighGrowthRate => inputs.high_growth_rate = value,
            ModelParameter::TerminalGrowthRate => inputs.terminal_growth_rate = value,
            ModelParameter::TaxRate => inputs.tax_rate = value,
            ModelParameter::HighGrowthYears => inputs.high_growth_years = whole_years(self, value)?,
            ModelParameter::FadeYears => inputs.fade_years = whole_years(self, value)?,
        }
        Ok(())
    }
}

impl fmt::Display for ModelParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelParameter {
    type Err = RdcfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "cost_of_capital" | "coc" | "discount_rate" => Ok(ModelParameter::CostOfCapital),
            "high_growth_rate" | "growth" => Ok(ModelParameter::HighGrowthRate),
            "high_growth_years" | "growth_period" => Ok(ModelParameter::HighGrowthYears),
            "fade_years" | "fade_period" => Ok(ModelParameter::FadeYears),
            "terminal_growth_rate" | "terminal_growth" => Ok(ModelParameter::TerminalGrowthRate),
            "tax_rate" | "tax" => Ok(ModelParameter::TaxRate),
            other => Err(RdcfError::invalid(
                "parameter",
                other,
                "Unknown model parameter",
            )),
        }
    }
}

fn whole_years(param: &ModelParameter, value: Decimal) -> RdcfResult<u32> {
    if value.fract() != Decimal::ZERO {
        return Err(RdcfError::invalid(
            param.as_str(),
            value,
            "Year counts must be whole numbers",
        ));
    }
    value
        .to_u32()
        .ok_or_else(|| RdcfError::invalid(param.as_str(), value, "Year count out of range"))
}

/// Input for an intrinsic P/E sensitivity sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    /// Base case model inputs
    pub base: ModelInputs,
    /// First variable to sweep (rows)
    pub variable_1: SensitivityVariable,
    /// Optional second variable (columns)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_2: Option<SensitivityVariable>,
}

/// Output of an intrinsic P/E sensitivity sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub variable_1_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_2_name: Option<String>,
    pub variable_1_values: Vec<Decimal>,
    /// Empty for a one-way sweep
    pub variable_2_values: Vec<Decimal>,
    /// matrix[i][j] = intrinsic P/E at (variable_1_values[i], variable_2_values[j]);
    /// one column for a one-way sweep. `None` where the inputs are invalid.
    pub matrix: Vec<Vec<Option<Multiple>>>,
    /// Intrinsic P/E of the unmodified base case
    pub base_case_value: Multiple,
    /// Cell closest to the base case (row, col)
    pub base_case_position: (usize, usize),
    pub invalid_cells: usize,
}

/// Generate the sweep values for a sensitivity variable from min to max with step.
fn generate_sweep_values(var: &SensitivityVariable) -> RdcfResult<Vec<Decimal>> {
    if var.step <= Decimal::ZERO {
        return Err(RdcfError::invalid(
            &format!("variable:{}", var.name),
            var.step,
            "Step must be positive",
        ));
    }
    if var.min > var.max {
        return Err(RdcfError::invalid(
            &format!("variable:{}", var.name),
            var.min,
            "Min must be <= max",
        ));
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        if values.len() >= MAX_SWEEP_POINTS {
            return Err(RdcfError::invalid(
                &format!("variable:{}", var.name),
                var.step,
                "Sweep produces more than 500 points",
            ));
        }
        values.push(current);
        current = match current.checked_add(var.step) {
            Some(next) => next,
            None => {
                return Err(RdcfError::invalid(
                    &format!("variable:{}", var.name),
                    var.step,
                    "Sweep runs past the representable decimal range",
                ))
            }
        };
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }

    Ok(values)
}

/// Find the closest index to a target value in a sorted list.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| {
            v.checked_sub(target)
                .map(|d| d.abs())
                .unwrap_or(Decimal::MAX)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Sweep one or two model parameters and report the intrinsic P/E at each point.
pub fn intrinsic_pe_sensitivity(
    input: &SensitivityInput,
) -> RdcfResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let base_case_value = intrinsic_pe(&input.base)?;

    let param_1: ModelParameter = input.variable_1.name.parse()?;
    let param_2: Option<ModelParameter> = input
        .variable_2
        .as_ref()
        .map(|v| v.name.parse())
        .transpose()?;
    if param_2 == Some(param_1) {
        return Err(RdcfError::invalid(
            "variable_2",
            param_1,
            "Sweep variables must differ",
        ));
    }

    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = match input.variable_2 {
        Some(ref v) => generate_sweep_values(v)?,
        None => Vec::new(),
    };

    let mut invalid_cells = 0usize;
    let mut matrix = Vec::with_capacity(v1_values.len());

    for v1 in &v1_values {
        let mut row = Vec::with_capacity(v2_values.len().max(1));
        if let Some(p2) = param_2 {
            for v2 in &v2_values {
                let cell = evaluate_cell(&input.base, &[(param_1, *v1), (p2, *v2)]);
                if cell.is_none() {
                    invalid_cells += 1;
                }
                row.push(cell);
            }
        } else {
            let cell = evaluate_cell(&input.base, &[(param_1, *v1)]);
            if cell.is_none() {
                invalid_cells += 1;
            }
            row.push(cell);
        }
        matrix.push(row);
    }

    if invalid_cells > 0 {
        warnings.push(format!(
            "{invalid_cells} grid point(s) have invalid inputs (e.g. terminal growth >= cost of capital) and were left empty"
        ));
    }

    let base_row = closest_index(&v1_values, param_1.get(&input.base));
    let base_col = param_2
        .map(|p| closest_index(&v2_values, p.get(&input.base)))
        .unwrap_or(0);

    tracing::debug!(
        rows = v1_values.len(),
        cols = v2_values.len(),
        invalid_cells,
        "evaluated sensitivity grid"
    );

    let output = SensitivityOutput {
        variable_1_name: param_1.to_string(),
        variable_2_name: param_2.map(|p| p.to_string()),
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        matrix,
        base_case_value,
        base_case_position: (base_row, base_col),
        invalid_cells,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Intrinsic P/E Sensitivity Sweep",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn evaluate_cell(base: &ModelInputs, overrides: &[(ModelParameter, Decimal)]) -> Option<Multiple> {
    let mut inputs = base.clone();
    for (param, value) in overrides {
        param.set(&mut inputs, *value).ok()?;
    }
    intrinsic_pe(&inputs).ok()
}
