use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// How rate flags on the command line are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateUnits {
    /// 0.10 = 10%
    Fraction,
    /// 10 = 10%
    Percent,
}

impl RateUnits {
    pub fn from_flag(percent: bool) -> Self {
        if percent {
            RateUnits::Percent
        } else {
            RateUnits::Fraction
        }
    }

    /// Convert a user-supplied rate into the fraction the engine expects.
    pub fn to_fraction(self, value: Decimal) -> Decimal {
        match self {
            RateUnits::Fraction => value,
            RateUnits::Percent => value / dec!(100),
        }
    }
}
