use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::RdcfError;
use crate::types::Rate;
use crate::RdcfResult;

/// Grow `value` by one period at `rate`: value * (1 + rate).
pub fn compound(value: Decimal, rate: Rate) -> RdcfResult<Decimal> {
    Decimal::ONE
        .checked_add(rate)
        .and_then(|factor| value.checked_mul(factor))
        .ok_or_else(|| RdcfError::Overflow {
            context: format!("compounding {value} at {rate}"),
        })
}

/// Accumulation factor (1 + rate)^periods.
pub fn accumulation_factor(rate: Rate, periods: u32) -> RdcfResult<Decimal> {
    if rate <= dec!(-1) {
        return Err(RdcfError::invalid(
            "rate",
            rate,
            "Rate must be greater than -100%",
        ));
    }
    Decimal::ONE
        .checked_add(rate)
        .and_then(|base| base.checked_powu(u64::from(periods)))
        .ok_or_else(|| RdcfError::Overflow {
            context: format!("(1 + {rate})^{periods}"),
        })
}

/// Discount factor (1 + rate)^-periods.
pub fn discount_factor(rate: Rate, periods: u32) -> RdcfResult<Decimal> {
    let factor = accumulation_factor(rate, periods)?;
    if factor.is_zero() {
        return Err(RdcfError::DivisionByZero {
            context: format!("discount factor at period {periods}"),
        });
    }
    Ok(Decimal::ONE / factor)
}

/// Present value of `amount` received `periods` years from now.
pub fn present_value(amount: Decimal, rate: Rate, periods: u32) -> RdcfResult<Decimal> {
    let factor = accumulation_factor(rate, periods)?;
    if factor.is_zero() {
        return Err(RdcfError::DivisionByZero {
            context: format!("present value at period {periods}"),
        });
    }
    amount
        .checked_div(factor)
        .ok_or_else(|| RdcfError::Overflow {
            context: format!("present value at period {periods}"),
        })
}

/// Gordon growth multiplier (1 + g) / (r - g): value at t of a perpetuity whose
/// first payment at t+1 is one unit grown at `growth`.
pub fn perpetuity_growth_factor(rate: Rate, growth: Rate) -> RdcfResult<Decimal> {
    let spread = rate.checked_sub(growth).ok_or_else(|| RdcfError::Overflow {
        context: format!("spread between {rate} and {growth}"),
    })?;
    if spread <= Decimal::ZERO {
        return Err(RdcfError::invalid(
            "terminal_growth_rate",
            growth,
            "terminal growth must be strictly below the discount rate",
        ));
    }
    Decimal::ONE
        .checked_add(growth)
        .and_then(|numerator| numerator.checked_div(spread))
        .ok_or_else(|| RdcfError::Overflow {
            context: format!("perpetuity factor (1 + {growth}) / {spread}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compound_basic() {
        assert_eq!(compound(dec!(100), dec!(0.10)).unwrap(), dec!(110.00));
    }

    #[test]
    fn test_compound_overflow_is_error() {
        let result = compound(Decimal::MAX, dec!(1));
        assert!(matches!(result, Err(RdcfError::Overflow { .. })));
    }

    #[test]
    fn test_discount_factor_two_years() {
        // 1 / 1.1^2 = 0.826446...
        let df = discount_factor(dec!(0.10), 2).unwrap();
        assert!((df - dec!(0.8264462809917355)).abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_present_value_zero_periods_is_identity() {
        assert_eq!(present_value(dec!(42), dec!(0.08), 0).unwrap(), dec!(42));
    }

    #[test]
    fn test_rate_at_minus_one_rejected() {
        assert!(accumulation_factor(dec!(-1), 3).is_err());
    }

    #[test]
    fn test_perpetuity_factor() {
        // (1.02) / (0.10 - 0.02) = 12.75
        assert_eq!(
            perpetuity_growth_factor(dec!(0.10), dec!(0.02)).unwrap(),
            dec!(12.75)
        );
    }

    #[test]
    fn test_perpetuity_factor_tiny_spread_is_overflow() {
        // 8 / 1e-28 exceeds the Decimal range
        let result = perpetuity_growth_factor(dec!(7.0000000000000000000000000001), dec!(7));
        assert!(matches!(result, Err(RdcfError::Overflow { .. })));
    }

    #[test]
    fn test_huge_rates_are_overflow_not_panic() {
        assert!(matches!(
            compound(dec!(1), Decimal::MAX),
            Err(RdcfError::Overflow { .. })
        ));
        assert!(matches!(
            accumulation_factor(Decimal::MAX, 1),
            Err(RdcfError::Overflow { .. })
        ));
        assert!(matches!(
            perpetuity_growth_factor(Decimal::MAX, dec!(-0.5)),
            Err(RdcfError::Overflow { .. })
        ));
    }

    #[test]
    fn test_perpetuity_factor_rejects_growth_at_rate() {
        let result = perpetuity_growth_factor(dec!(0.08), dec!(0.08));
        assert!(matches!(
            result,
            Err(RdcfError::InvalidModelInput { ref field, .. }) if field == "terminal_growth_rate"
        ));
    }
}
