use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use rdcf_core::provider::{value_company, MetricsProvider};
use rdcf_core::valuation::{ModelInputs, Verdict};

use super::{Context, ModelArgs};
use crate::input::metrics::FileMetricsProvider;

/// Arguments for valuing listed companies from a metrics file
#[derive(Args)]
pub struct CompanyArgs {
    /// Symbols to value (case-insensitive)
    #[arg(required_unless_present = "all")]
    pub symbols: Vec<String>,

    /// Path to JSON file with an array of company metrics
    #[arg(long)]
    pub metrics: String,

    /// Value every company in the metrics file
    #[arg(long)]
    pub all: bool,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// One output row per requested symbol. Failed symbols carry `error`
/// and leave the numeric columns empty.
#[derive(Debug, Serialize)]
struct CompanyRow {
    symbol: String,
    current_pe: Option<Decimal>,
    reference_pe: Option<Decimal>,
    effective_pe: Option<Decimal>,
    intrinsic_pe: Option<Decimal>,
    overvaluation_pct: Option<Decimal>,
    verdict: Option<Verdict>,
    warnings: Option<String>,
    error: Option<String>,
}

impl CompanyRow {
    fn failed(symbol: &str, error: String) -> Self {
        CompanyRow {
            symbol: symbol.to_string(),
            current_pe: None,
            reference_pe: None,
            effective_pe: None,
            intrinsic_pe: None,
            overvaluation_pct: None,
            verdict: None,
            warnings: None,
            error: Some(error),
        }
    }
}

pub fn run_company(args: CompanyArgs, ctx: &Context) -> Result<Value, Box<dyn std::error::Error>> {
    let provider = FileMetricsProvider::load(&args.metrics)?;
    let symbols = if args.all {
        provider.symbols()
    } else {
        args.symbols.clone()
    };
    let model = args.model.resolve(ctx);

    let rows = value_symbols(&provider, &symbols, &model, ctx.decimals);
    if !rows.is_empty() && rows.iter().all(|r| r.error.is_some()) {
        return Err(format!("No company could be valued ({} requested)", rows.len()).into());
    }

    Ok(serde_json::to_value(rows)?)
}

fn value_symbols<P: MetricsProvider + ?Sized>(
    provider: &P,
    symbols: &[String],
    model: &ModelInputs,
    decimals: u32,
) -> Vec<CompanyRow> {
    symbols
        .iter()
        .map(|symbol| match value_company(provider, symbol, model) {
            Ok(output) => {
                let company = output.result;
                let valuation = company.valuation.rounded(decimals);
                CompanyRow {
                    symbol: company.symbol,
                    current_pe: company.metrics.current_pe,
                    reference_pe: company.metrics.reference_pe,
                    effective_pe: Some(company.effective_pe),
                    intrinsic_pe: Some(valuation.intrinsic_pe),
                    overvaluation_pct: Some(valuation.overvaluation_pct),
                    verdict: Some(company.valuation.verdict()),
                    warnings: (!output.warnings.is_empty()).then(|| output.warnings.join("; ")),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "company valuation failed");
                CompanyRow::failed(symbol, e.to_string())
            }
        })
        .collect()
}
