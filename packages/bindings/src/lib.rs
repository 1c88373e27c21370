use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rdcf_core::scenarios::sensitivity::{intrinsic_pe_sensitivity, SensitivityInput};
use rdcf_core::valuation::growth::GrowthTrajectory;
use rdcf_core::valuation::overvaluation::{score, ObservedMultiples};
use rdcf_core::valuation::reverse_dcf::{run_reverse_dcf, ReverseDcfInput};
use rdcf_core::valuation::{ModelInputs, Verdict};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(Deserialize)]
struct OvervaluationRequest {
    intrinsic_pe: Decimal,
    current_pe: Decimal,
    reference_pe: Decimal,
}

#[derive(Serialize)]
struct OvervaluationResponse {
    intrinsic_pe: Decimal,
    effective_pe: Decimal,
    overvaluation_pct: Decimal,
    verdict: Verdict,
}

#[derive(Serialize)]
struct IntrinsicPeResponse {
    intrinsic_pe: Decimal,
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

#[napi]
pub fn intrinsic_pe(input_json: String) -> NapiResult<String> {
    let inputs: ModelInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let intrinsic_pe = rdcf_core::valuation::intrinsic::intrinsic_pe(&inputs).map_err(to_napi_error)?;
    serde_json::to_string(&IntrinsicPeResponse { intrinsic_pe }).map_err(to_napi_error)
}

#[napi]
pub fn growth_schedule(input_json: String) -> NapiResult<String> {
    let inputs: ModelInputs = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let trajectory = GrowthTrajectory::from_inputs(&inputs).map_err(to_napi_error)?;
    serde_json::to_string(&trajectory).map_err(to_napi_error)
}

#[napi]
pub fn overvaluation(input_json: String) -> NapiResult<String> {
    let request: OvervaluationRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let observed = ObservedMultiples {
        current_pe: request.current_pe,
        reference_pe: request.reference_pe,
    };
    let result = score(&observed, request.intrinsic_pe).map_err(to_napi_error)?;
    let response = OvervaluationResponse {
        intrinsic_pe: result.intrinsic_pe,
        effective_pe: observed.effective_pe(),
        overvaluation_pct: result.overvaluation_pct,
        verdict: result.verdict(),
    };
    serde_json::to_string(&response).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Full runs
// ---------------------------------------------------------------------------

#[napi]
pub fn reverse_dcf(input_json: String) -> NapiResult<String> {
    let input: ReverseDcfInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = run_reverse_dcf(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn sensitivity(input_json: String) -> NapiResult<String> {
    let input: SensitivityInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = intrinsic_pe_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
