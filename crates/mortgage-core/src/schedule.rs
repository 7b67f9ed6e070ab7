use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::loan::LoanSpec;
use crate::phases::{PaymentKind, PaymentPhase};
use crate::time_value::{level_payment, monthly_rate};
use crate::types::{Money, Rate};
use crate::MortgageResult;

/// Residual balance below this is treated as fully retired.
pub const BALANCE_TOLERANCE: Decimal = dec!(0.01);

/// One month of the payment ledger, 1-indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationEntry {
    pub month: u32,
    pub beginning_balance: Money,
    /// Total cash out this month, including any extra principal.
    pub monthly_payment: Money,
    pub principal_payment: Money,
    pub interest_payment: Money,
    pub extra_payment: Money,
    pub ending_balance: Money,
    pub payment_phase: PaymentKind,
    /// Annual percentage rate in effect this month.
    pub interest_rate: Rate,
}

/// Completed payment ledger for a loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub entries: Vec<AmortizationEntry>,
    /// Principal still outstanding at term end, due in full. Present only
    /// when the phase sequence never amortizes the balance away.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balloon_payment: Option<Money>,
}

/// Walk the phase sequence month by month, carrying the balance forward.
///
/// The level payment of an amortizing phase is computed once at phase entry
/// over the months remaining to *term end*, so each ARM adjustment
/// re-amortizes the current balance and the loan still retires at the
/// declared term. The final scheduled principal is clamped to zero out the
/// balance exactly, absorbing residual drift.
pub fn generate_schedule(
    spec: &LoanSpec,
    phases: &[PaymentPhase],
) -> MortgageResult<ScheduleOutput> {
    let term_months = spec.term_months();
    let mut entries: Vec<AmortizationEntry> = Vec::with_capacity(term_months as usize);
    let mut balance = spec.loan_amount;
    let mut month = 0u32;

    'phases: for phase in phases {
        let rate = monthly_rate(phase.annual_rate);
        let phase_payment = match phase.kind {
            PaymentKind::Amortizing => level_payment(balance, rate, term_months - month)?,
            PaymentKind::InterestOnly => Decimal::ZERO,
        };

        for _ in 0..phase.duration_months {
            month += 1;
            let beginning_balance = balance;
            let interest_payment = balance * rate;

            let (mut monthly_payment, mut principal_payment) = match phase.kind {
                PaymentKind::InterestOnly => (interest_payment, Decimal::ZERO),
                PaymentKind::Amortizing => (phase_payment, phase_payment - interest_payment),
            };

            // Clamp the last scheduled principal so the balance lands on
            // exactly zero, and never overdraw a balance already shrunk by
            // extra payments.
            if phase.kind == PaymentKind::Amortizing
                && (month == term_months || principal_payment > balance)
            {
                principal_payment = balance;
                monthly_payment = interest_payment + principal_payment;
            }

            let extra_payment = spec
                .extra_payments
                .get(&month)
                .copied()
                .unwrap_or(Decimal::ZERO)
                .min(balance - principal_payment)
                .max(Decimal::ZERO);

            principal_payment += extra_payment;
            monthly_payment += extra_payment;
            balance -= principal_payment;

            entries.push(AmortizationEntry {
                month,
                beginning_balance,
                monthly_payment,
                principal_payment,
                interest_payment,
                extra_payment,
                ending_balance: balance,
                payment_phase: phase.kind,
                interest_rate: phase.annual_rate,
            });

            if balance <= BALANCE_TOLERANCE && month < term_months {
                break 'phases;
            }
        }
    }

    let balloon_payment = if balance > BALANCE_TOLERANCE {
        Some(balance)
    } else {
        None
    };

    Ok(ScheduleOutput {
        entries,
        balloon_payment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{validate_request, ArmDetails, InterestOnlyDetails, LoanRequest};
    use crate::phases::resolve_phases;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn schedule_for(request: LoanRequest) -> ScheduleOutput {
        let spec = validate_request(&request).unwrap();
        let phases = resolve_phases(&spec);
        generate_schedule(&spec, &phases).unwrap()
    }

    fn conventional_request() -> LoanRequest {
        LoanRequest {
            home_price: Some(dec!(400000)),
            down_payment: Some(dec!(80000)),
            interest_rate: Some(dec!(6.0)),
            loan_term_years: Some(30),
            loan_type: Some("conventional".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_conventional_schedule_shape_and_payoff() {
        let out = schedule_for(conventional_request());

        assert_eq!(out.entries.len(), 360);
        assert_eq!(out.entries[0].month, 1);
        assert_eq!(out.entries[359].month, 360);
        assert_eq!(out.entries[359].ending_balance, Decimal::ZERO);
        assert!(out.balloon_payment.is_none());

        // Payment ~ 1918.56 throughout.
        let pmt = out.entries[0].monthly_payment;
        assert!((pmt - dec!(1918.56)).abs() < dec!(0.05), "got {pmt}");
    }

    #[test]
    fn test_balance_recursion_and_payment_composition() {
        let out = schedule_for(conventional_request());

        let mut previous = dec!(320000);
        for entry in &out.entries {
            assert_eq!(entry.beginning_balance, previous);
            assert_eq!(entry.ending_balance, previous - entry.principal_payment);
            let recomposed = entry.principal_payment + entry.interest_payment;
            assert!(
                (entry.monthly_payment - recomposed).abs() < dec!(0.000001),
                "month {}: payment {} != principal + interest {}",
                entry.month,
                entry.monthly_payment,
                recomposed
            );
            previous = entry.ending_balance;
        }
    }

    #[test]
    fn test_first_month_interest_split() {
        let out = schedule_for(conventional_request());
        let first = &out.entries[0];
        // 320,000 * 0.005 = 1600 interest in month one.
        assert_eq!(first.interest_payment, dec!(1600.00000));
        assert!(first.principal_payment > dec!(318));
        assert!(first.principal_payment < dec!(319));
    }

    #[test]
    fn test_zero_rate_amortizes_linearly() {
        let out = schedule_for(LoanRequest {
            interest_rate: Some(dec!(0)),
            ..conventional_request()
        });

        for entry in &out.entries {
            assert_eq!(entry.interest_payment, Decimal::ZERO);
        }
        // 320,000 / 360 ~ 888.89
        let pmt = out.entries[0].monthly_payment;
        assert!((pmt - dec!(888.89)).abs() < dec!(0.01), "got {pmt}");
        assert_eq!(out.entries.last().unwrap().ending_balance, Decimal::ZERO);
    }

    #[test]
    fn test_hybrid_interest_only_then_recomputed_payment() {
        let out = schedule_for(LoanRequest {
            home_price: Some(dec!(400000)),
            down_payment: Some(dec!(80000)),
            interest_rate: Some(dec!(5.0)),
            loan_term_years: Some(30),
            loan_type: Some("interest_only_hybrid".into()),
            interest_only_details: Some(InterestOnlyDetails {
                interest_only_period_years: 5,
                transition_rate: Some(dec!(6.0)),
            }),
            ..Default::default()
        });

        // Months 1-60: interest-only on the full balance.
        for entry in &out.entries[..60] {
            assert_eq!(entry.payment_phase, PaymentKind::InterestOnly);
            assert_eq!(entry.principal_payment, Decimal::ZERO);
            assert_eq!(entry.ending_balance, dec!(320000));
            // 320,000 * 0.05 / 12
            assert!((entry.monthly_payment - dec!(1333.33)).abs() < dec!(0.01));
        }

        // Month 61 starts a level payment over the remaining 300 months at 6%.
        let month61 = &out.entries[60];
        assert_eq!(month61.payment_phase, PaymentKind::Amortizing);
        let expected = level_payment(dec!(320000), dec!(0.005), 300).unwrap();
        assert!((month61.monthly_payment - expected).abs() < dec!(0.01));

        assert_eq!(out.entries.len(), 360);
        assert_eq!(out.entries[359].ending_balance, Decimal::ZERO);
        assert!(out.balloon_payment.is_none());
    }

    #[test]
    fn test_interest_only_reports_balloon() {
        let out = schedule_for(LoanRequest {
            home_price: Some(dec!(300000)),
            down_payment: Some(dec!(60000)),
            interest_rate: Some(dec!(5.0)),
            loan_term_years: Some(10),
            loan_type: Some("interest_only".into()),
            interest_only_details: Some(InterestOnlyDetails {
                interest_only_period_years: 10,
                transition_rate: None,
            }),
            ..Default::default()
        });

        assert_eq!(out.entries.len(), 120);
        for entry in &out.entries {
            assert_eq!(entry.principal_payment, Decimal::ZERO);
            assert_eq!(entry.ending_balance, dec!(240000));
        }
        assert_eq!(out.balloon_payment, Some(dec!(240000)));
    }

    #[test]
    fn test_arm_reamortizes_at_each_adjustment() {
        let out = schedule_for(LoanRequest {
            home_price: Some(dec!(350000)),
            down_payment: Some(dec!(70000)),
            interest_rate: Some(dec!(4.5)),
            loan_term_years: Some(30),
            loan_type: Some("arm".into()),
            arm_details: Some(ArmDetails {
                initial_period_years: 5,
                adjustment_frequency_years: 5,
                expected_rates: vec![dec!(5.5), dec!(6.0), dec!(6.5), dec!(7.0), dec!(7.5)],
            }),
            ..Default::default()
        });

        // Rate echo changes exactly at the window boundary.
        assert_eq!(out.entries[59].interest_rate, dec!(4.5));
        assert_eq!(out.entries[60].interest_rate, dec!(5.5));

        // Month 61 payment is the balance at that point re-amortized over
        // the remaining 300 months at the new rate.
        let boundary = &out.entries[60];
        let expected = level_payment(
            boundary.beginning_balance,
            monthly_rate(dec!(5.5)),
            300,
        )
        .unwrap();
        assert!((boundary.monthly_payment - expected).abs() < dec!(0.01));

        // Still retires at the declared term.
        assert_eq!(out.entries.len(), 360);
        assert_eq!(out.entries[359].ending_balance, Decimal::ZERO);
    }

    #[test]
    fn test_arm_rate_change_only_affects_later_months() {
        let base = LoanRequest {
            home_price: Some(dec!(350000)),
            down_payment: Some(dec!(70000)),
            interest_rate: Some(dec!(4.5)),
            loan_term_years: Some(30),
            loan_type: Some("arm".into()),
            arm_details: Some(ArmDetails {
                initial_period_years: 5,
                adjustment_frequency_years: 5,
                expected_rates: vec![dec!(5.5), dec!(6.0), dec!(6.5), dec!(7.0), dec!(7.5)],
            }),
            ..Default::default()
        };
        let mut bumped = base.clone();
        bumped.arm_details = Some(ArmDetails {
            initial_period_years: 5,
            adjustment_frequency_years: 5,
            // Second window bumped from 6.0 to 8.0.
            expected_rates: vec![dec!(5.5), dec!(8.0), dec!(6.5), dec!(7.0), dec!(7.5)],
        });

        let a = schedule_for(base);
        let b = schedule_for(bumped);

        // Identical through the first adjustment window (months 1-120).
        for (ea, eb) in a.entries[..120].iter().zip(&b.entries[..120]) {
            assert_eq!(ea.monthly_payment, eb.monthly_payment, "month {}", ea.month);
            assert_eq!(ea.ending_balance, eb.ending_balance, "month {}", ea.month);
        }
        // Diverges from month 121 onward.
        assert!(b.entries[120].monthly_payment > a.entries[120].monthly_payment);
    }

    #[test]
    fn test_extra_payments_retire_loan_early() {
        let mut extra = BTreeMap::new();
        for m in 1..=360u32 {
            extra.insert(m, dec!(500));
        }
        let out = schedule_for(LoanRequest {
            extra_payments: Some(extra),
            ..conventional_request()
        });

        assert!(out.entries.len() < 360, "got {} months", out.entries.len());
        let last = out.entries.last().unwrap();
        assert!(last.ending_balance <= BALANCE_TOLERANCE);
        assert!(out.balloon_payment.is_none());
        // Extra amounts show up in both the extra and total columns.
        assert_eq!(out.entries[0].extra_payment, dec!(500));
        assert!(
            (out.entries[0].monthly_payment
                - (out.entries[0].principal_payment + out.entries[0].interest_payment))
                .abs()
                < dec!(0.000001)
        );
    }

    #[test]
    fn test_final_extra_payment_capped_at_balance() {
        let mut extra = BTreeMap::new();
        extra.insert(359u32, dec!(10_000_000));
        let out = schedule_for(LoanRequest {
            extra_payments: Some(extra),
            ..conventional_request()
        });

        let last = out.entries.last().unwrap();
        assert_eq!(last.month, 359);
        assert_eq!(last.ending_balance, Decimal::ZERO);
    }
}
