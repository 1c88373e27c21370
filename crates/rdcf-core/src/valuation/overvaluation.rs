use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RdcfError;
use crate::types::{Multiple, Percent};
use crate::RdcfResult;

/// Market multiples supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedMultiples {
    /// Current trading P/E
    pub current_pe: Multiple,
    /// Reference P/E, e.g. the last fiscal year's multiple
    pub reference_pe: Multiple,
}

impl ObservedMultiples {
    pub fn validate(&self) -> RdcfResult<()> {
        if self.current_pe <= Decimal::ZERO {
            return Err(RdcfError::invalid(
                "current_pe",
                self.current_pe,
                "Observed P/E must be positive",
            ));
        }
        if self.reference_pe <= Decimal::ZERO {
            return Err(RdcfError::invalid(
                "reference_pe",
                self.reference_pe,
                "Observed P/E must be positive",
            ));
        }
        Ok(())
    }

    /// The lower of the two observed multiples.
    pub fn effective_pe(&self) -> Multiple {
        self.current_pe.min(self.reference_pe)
    }
}

/// Direction of the market's deviation from the intrinsic multiple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Overvalued,
    FairlyValued,
    Undervalued,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Overvalued => write!(f, "overvalued"),
            Verdict::FairlyValued => write!(f, "fairly valued"),
            Verdict::Undervalued => write!(f, "undervalued"),
        }
    }
}

/// Intrinsic multiple and the market's premium or discount to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub intrinsic_pe: Multiple,
    /// Positive: overvalued. Negative: undervalued.
    pub overvaluation_pct: Percent,
}

impl ValuationResult {
    /// Copy rounded for display. The engine itself never rounds.
    pub fn rounded(&self, dp: u32) -> Self {
        ValuationResult {
            intrinsic_pe: self.intrinsic_pe.round_dp(dp),
            overvaluation_pct: self.overvaluation_pct.round_dp(dp),
        }
    }

    pub fn is_overvalued(&self) -> bool {
        self.overvaluation_pct > Decimal::ZERO
    }

    pub fn verdict(&self) -> Verdict {
        match self.overvaluation_pct.cmp(&Decimal::ZERO) {
            std::cmp::Ordering::Greater => Verdict::Overvalued,
            std::cmp::Ordering::Equal => Verdict::FairlyValued,
            std::cmp::Ordering::Less => Verdict::Undervalued,
        }
    }
}

/// `(min(current_pe, reference_pe) / intrinsic_pe - 1) * 100`
pub fn overvaluation_pct(observed: &ObservedMultiples, intrinsic_pe: Multiple) -> RdcfResult<Percent> {
    observed.validate()?;
    if intrinsic_pe <= Decimal::ZERO {
        return Err(RdcfError::DivisionByZero {
            context: format!("overvaluation against intrinsic P/E {intrinsic_pe}"),
        });
    }
    let effective_pe = observed.effective_pe();
    effective_pe
        .checked_div(intrinsic_pe)
        .and_then(|ratio| ratio.checked_sub(Decimal::ONE))
        .and_then(|excess| excess.checked_mul(dec!(100)))
        .ok_or_else(|| RdcfError::Overflow {
            context: format!("overvaluation of P/E {effective_pe} against intrinsic P/E {intrinsic_pe}"),
        })
}

/// Score observed multiples against an intrinsic multiple.
pub fn score(observed: &ObservedMultiples, intrinsic_pe: Multiple) -> RdcfResult<ValuationResult> {
    Ok(ValuationResult {
        intrinsic_pe,
        overvaluation_pct: overvaluation_pct(observed, intrinsic_pe)?,
    })
}
