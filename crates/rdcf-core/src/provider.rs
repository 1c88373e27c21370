//! Company metrics supplied by an external source.
//!
//! The engine only sees the [`MetricsProvider`] trait. Where the numbers come
//! from (a file, an API, a fixture) is the implementor's concern; an
//! in-memory [`StaticMetricsProvider`] is included for tests and embedding.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

use crate::error::RdcfError;
use crate::types::{with_metadata, ComputationOutput, Multiple, Rate};
use crate::valuation::intrinsic::calculate_intrinsic_pe;
use crate::valuation::overvaluation::{score, ObservedMultiples, ValuationResult};
use crate::valuation::ModelInputs;
use crate::RdcfResult;

/// Relative gap between current and reference P/E above which a warning is attached.
const MULTIPLE_DISAGREEMENT_WARNING: Decimal = dec!(0.50);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Historical growth figures, as fractions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthHistory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttm: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_year: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub five_year: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ten_year: Option<Rate>,
}

/// Market and fundamental metrics for one listed company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyMetrics {
    /// Exchange symbol, e.g. "NESTLEIND"
    pub symbol: String,
    /// Current trading P/E
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_pe: Option<Multiple>,
    /// Reference P/E, e.g. last fiscal year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_pe: Option<Multiple>,
    /// Five-year median return on capital employed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roce_5yr_median: Option<Rate>,
    #[serde(default)]
    pub growth: GrowthHistory,
    /// Date the figures were taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
}

impl CompanyMetrics {
    /// Observed multiples for scoring. Missing values are an error, never zero.
    pub fn observed_multiples(&self) -> RdcfResult<ObservedMultiples> {
        let current_pe = self.current_pe.ok_or_else(|| {
            RdcfError::InsufficientData(format!("{}: current P/E not available", self.symbol))
        })?;
        let reference_pe = self.reference_pe.ok_or_else(|| {
            RdcfError::InsufficientData(format!("{}: reference P/E not available", self.symbol))
        })?;
        let observed = ObservedMultiples {
            current_pe,
            reference_pe,
        };
        observed.validate()?;
        Ok(observed)
    }
}

/// Source of company metrics.
pub trait MetricsProvider {
    fn company_metrics(&self, symbol: &str) -> RdcfResult<CompanyMetrics>;
}

impl<P: MetricsProvider + ?Sized> MetricsProvider for &P {
    fn company_metrics(&self, symbol: &str) -> RdcfResult<CompanyMetrics> {
        (**self).company_metrics(symbol)
    }
}

impl<P: MetricsProvider + ?Sized> MetricsProvider for Box<P> {
    fn company_metrics(&self, symbol: &str) -> RdcfResult<CompanyMetrics> {
        (**self).company_metrics(symbol)
    }
}

/// In-memory provider keyed by upper-cased symbol.
#[derive(Debug, Clone, Default)]
pub struct StaticMetricsProvider {
    companies: HashMap<String, CompanyMetrics>,
}

impl StaticMetricsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, metrics: CompanyMetrics) {
        self.companies.insert(normalize_symbol(&metrics.symbol), metrics);
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.companies.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}

impl FromIterator<CompanyMetrics> for StaticMetricsProvider {
    fn from_iter<I: IntoIterator<Item = CompanyMetrics>>(iter: I) -> Self {
        let mut provider = StaticMetricsProvider::new();
        for metrics in iter {
            provider.insert(metrics);
        }
        provider
    }
}

impl MetricsProvider for StaticMetricsProvider {
    fn company_metrics(&self, symbol: &str) -> RdcfResult<CompanyMetrics> {
        self.companies
            .get(&normalize_symbol(symbol))
            .cloned()
            .ok_or_else(|| RdcfError::InsufficientData(format!("No metrics for symbol '{symbol}'")))
    }
}

pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Valuation of one company against its observed multiples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyValuation {
    pub symbol: String,
    pub metrics: CompanyMetrics,
    pub effective_pe: Multiple,
    pub valuation: ValuationResult,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Fetch metrics for `symbol` and score them against the intrinsic P/E.
pub fn value_company<P: MetricsProvider + ?Sized>(
    provider: &P,
    symbol: &str,
    model: &ModelInputs,
) -> RdcfResult<ComputationOutput<CompanyValuation>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let metrics = provider.company_metrics(symbol)?;
    let observed = metrics.observed_multiples()?;
    let breakdown = calculate_intrinsic_pe(model)?;
    let valuation = score(&observed, breakdown.intrinsic_pe)?;

    let gap = observed
        .current_pe
        .checked_sub(observed.reference_pe)
        .and_then(|d| d.abs().checked_div(observed.effective_pe()));
    // A gap too wide to represent still warrants the warning.
    if gap.map_or(true, |g| g > MULTIPLE_DISAGREEMENT_WARNING) {
        let shown = gap
            .and_then(|g| g.checked_mul(dec!(100)))
            .map_or_else(|| "an unrepresentable".to_string(), |pct| format!("{pct:.1}%"));
        warnings.push(format!(
            "Current P/E ({}) and reference P/E ({}) differ by {}; the lower one was used",
            observed.current_pe, observed.reference_pe, shown
        ));
    }
    if let Some(five_year) = metrics.growth.five_year {
        let doubled = five_year.checked_mul(dec!(2)).unwrap_or(Decimal::MAX);
        if model.high_growth_rate > doubled && five_year > Decimal::ZERO {
            warnings.push(format!(
                "Assumed high growth ({}) is more than double the five-year history ({five_year})",
                model.high_growth_rate
            ));
        }
    }

    tracing::debug!(
        symbol = %metrics.symbol,
        intrinsic_pe = %valuation.intrinsic_pe,
        overvaluation_pct = %valuation.overvaluation_pct,
        "valued company"
    );

    let output = CompanyValuation {
        symbol: metrics.symbol.clone(),
        effective_pe: observed.effective_pe(),
        metrics,
        valuation,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Three-Phase Reverse DCF vs. Observed P/E",
        model,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
