use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::MortgageError;
use crate::types::{Money, Rate};
use crate::MortgageResult;

/// Below this monthly rate the annuity denominator is too small to trust;
/// amortization falls back to the linear payment L / n.
const RATE_EPSILON: Decimal = dec!(0.0000001);

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Convert an annual percentage rate (6.0 = 6%) to a monthly decimal rate.
///
/// This is the single place the percentage convention is fixed; every
/// downstream computation takes monthly decimal rates.
pub fn monthly_rate(annual_pct: Rate) -> Rate {
    annual_pct / MONTHS_PER_YEAR / PERCENT
}

/// Level monthly payment that retires `balance` over `months` at a monthly
/// decimal `rate`: balance * r / (1 - (1+r)^-n).
///
/// Zero and near-zero rates take the linear branch `balance / months`.
pub fn level_payment(balance: Money, rate: Rate, months: u32) -> MortgageResult<Money> {
    if months == 0 {
        return Err(MortgageError::InvalidInput {
            field: "months".into(),
            reason: "Payment period must be at least one month".into(),
        });
    }

    if rate.abs() < RATE_EPSILON {
        return Ok(balance / Decimal::from(months));
    }

    let factor = (Decimal::ONE + rate).powd(Decimal::from(months));
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(MortgageError::DivisionByZero {
            context: "level payment annuity factor".into(),
        });
    }

    Ok(balance * rate * factor / denominator)
}

/// Net Present Value of a series of cash flows at a periodic discount rate.
/// The first flow sits at t = 0 and is not discounted.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> MortgageResult<Money> {
    if rate <= dec!(-1) {
        return Err(MortgageError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        if discount.is_zero() {
            return Err(MortgageError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result += cf / discount;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_rate_convention() {
        // 6% annual -> 0.005 monthly
        assert_eq!(monthly_rate(dec!(6.0)), dec!(0.005));
    }

    #[test]
    fn test_level_payment_standard_30yr() {
        // 320,000 at 0.5%/month over 360 months ~ 1918.56
        let pmt = level_payment(dec!(320000), dec!(0.005), 360).unwrap();
        assert!((pmt - dec!(1918.56)).abs() < dec!(0.05), "got {pmt}");
    }

    #[test]
    fn test_level_payment_zero_rate_is_linear() {
        let pmt = level_payment(dec!(120000), Decimal::ZERO, 120).unwrap();
        assert_eq!(pmt, dec!(1000));
    }

    #[test]
    fn test_level_payment_near_zero_rate_is_linear() {
        let pmt = level_payment(dec!(120000), dec!(0.00000001), 120).unwrap();
        assert_eq!(pmt, dec!(1000));
    }

    #[test]
    fn test_level_payment_zero_months_rejected() {
        assert!(level_payment(dec!(1000), dec!(0.005), 0).is_err());
    }

    #[test]
    fn test_npv_basic() {
        let cfs = vec![dec!(-1000), dec!(300), dec!(400), dec!(500)];
        let result = npv(dec!(0.10), &cfs).unwrap();
        // NPV at 10%: -1000 + 300/1.1 + 400/1.21 + 500/1.331 ~ -21.04
        assert!((result - dec!(-21.04)).abs() < dec!(1.0));
    }

    #[test]
    fn test_npv_zero_rate() {
        let cfs = vec![dec!(-100), dec!(50), dec!(50), dec!(50)];
        let result = npv(dec!(0.0), &cfs).unwrap();
        assert_eq!(result, dec!(50));
    }
}
