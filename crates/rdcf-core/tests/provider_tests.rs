use chrono::NaiveDate;
use rdcf_core::provider::{
    value_company, CompanyMetrics, GrowthHistory, MetricsProvider, StaticMetricsProvider,
};
use rdcf_core::valuation::ModelInputs;
use rdcf_core::{RdcfError, RdcfResult};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::thread;

fn model() -> ModelInputs {
    ModelInputs {
        cost_of_capital: dec!(0.10),
        roce: dec!(0.20),
        high_growth_rate: dec!(0.15),
        high_growth_years: 5,
        fade_years: 5,
        terminal_growth_rate: dec!(0.02),
        tax_rate: dec!(0.25),
    }
}

fn company(symbol: &str, current: Decimal, reference: Decimal) -> CompanyMetrics {
    CompanyMetrics {
        symbol: symbol.into(),
        current_pe: Some(current),
        reference_pe: Some(reference),
        roce_5yr_median: Some(dec!(0.35)),
        growth: GrowthHistory {
            ttm: Some(dec!(0.12)),
            three_year: Some(dec!(0.10)),
            five_year: Some(dec!(0.09)),
            ten_year: Some(dec!(0.07)),
        },
        as_of: NaiveDate::from_ymd_opt(2024, 3, 31),
    }
}

fn provider() -> StaticMetricsProvider {
    vec![
        company("NESTLEIND", dec!(72.4), dec!(80.1)),
        company("ITC", dec!(25.0), dec!(26.5)),
        company("BARGAIN", dec!(9.0), dec!(12.0)),
    ]
    .into_iter()
    .collect()
}

/// Provider that always fails, standing in for an unavailable data source.
struct Unavailable;

impl MetricsProvider for Unavailable {
    fn company_metrics(&self, symbol: &str) -> RdcfResult<CompanyMetrics> {
        Err(RdcfError::InsufficientData(format!("{symbol}: source offline")))
    }
}

#[test]
fn test_value_company_uses_lower_multiple() {
    let output = value_company(&provider(), "nestleind", &model()).unwrap();
    let out = &output.result;
    assert_eq!(out.symbol, "NESTLEIND");
    assert_eq!(out.effective_pe, dec!(72.4));
    // 72.4 / 19.3104 - 1 ~ +274.9%
    assert!((out.valuation.overvaluation_pct - dec!(274.93)).abs() < dec!(0.05));
    assert!(out.valuation.is_overvalued());
}

#[test]
fn test_undervalued_company() {
    let output = value_company(&provider(), "BARGAIN", &model()).unwrap();
    assert!(output.result.valuation.overvaluation_pct < Decimal::ZERO);
}

#[test]
fn test_unknown_symbol_propagates() {
    let result = value_company(&provider(), "MISSING", &model());
    assert!(matches!(result, Err(RdcfError::InsufficientData(_))));
}

#[test]
fn test_failing_provider_propagates() {
    let boxed: Box<dyn MetricsProvider> = Box::new(Unavailable);
    let result = value_company(&boxed, "ITC", &model());
    assert!(matches!(result, Err(RdcfError::InsufficientData(_))));
}

#[test]
fn test_invalid_model_reported_before_scoring() {
    let mut bad = model();
    bad.terminal_growth_rate = dec!(0.12);
    let result = value_company(&provider(), "ITC", &bad);
    assert!(matches!(result, Err(RdcfError::InvalidModelInput { .. })));
}

#[test]
fn test_growth_history_warning() {
    let mut aggressive = model();
    aggressive.high_growth_rate = dec!(0.25);
    let output = value_company(&provider(), "ITC", &aggressive).unwrap();
    assert!(output
        .warnings
        .iter()
        .any(|w| w.contains("five-year history")));
}

#[test]
fn test_metrics_deserialize_with_missing_growth() {
    let json = r#"{ "symbol": "TCS", "current_pe": "30.5", "reference_pe": "28" }"#;
    let metrics: CompanyMetrics = serde_json::from_str(json).unwrap();
    assert_eq!(metrics.growth, GrowthHistory::default());
    assert_eq!(metrics.observed_multiples().unwrap().effective_pe(), dec!(28));
}

#[test]
fn test_concurrent_valuations_agree() {
    let shared = Arc::new(provider());
    let handles: Vec<_> = ["NESTLEIND", "ITC", "BARGAIN"]
        .into_iter()
        .map(|symbol| {
            let p = Arc::clone(&shared);
            thread::spawn(move || {
                value_company(p.as_ref(), symbol, &model())
                    .unwrap()
                    .result
                    .valuation
            })
        })
        .collect();

    for (handle, symbol) in handles.into_iter().zip(["NESTLEIND", "ITC", "BARGAIN"]) {
        let threaded = handle.join().unwrap();
        let direct = value_company(&provider(), symbol, &model())
            .unwrap()
            .result
            .valuation;
        assert_eq!(threaded, direct);
    }
}
