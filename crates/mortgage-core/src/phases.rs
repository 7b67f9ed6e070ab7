use serde::{Deserialize, Serialize};

use crate::loan::{ArmDetails, LoanSpec, LoanType};
use crate::types::Rate;

/// Payment behavior within a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    InterestOnly,
    Amortizing,
}

/// A contiguous run of months sharing one rate and one payment formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPhase {
    pub duration_months: u32,
    /// Annual percentage rate in effect for the phase.
    pub annual_rate: Rate,
    pub kind: PaymentKind,
}

impl PaymentPhase {
    fn amortizing(duration_months: u32, annual_rate: Rate) -> Self {
        PaymentPhase {
            duration_months,
            annual_rate,
            kind: PaymentKind::Amortizing,
        }
    }

    fn interest_only(duration_months: u32, annual_rate: Rate) -> Self {
        PaymentPhase {
            duration_months,
            annual_rate,
            kind: PaymentKind::InterestOnly,
        }
    }
}

/// Rate adjustment policy: one amortizing phase per ARM adjustment window
/// after the initial fixed period. Windows are `adjustment_frequency_years`
/// long (the last truncated to the remaining term) and consume
/// `expected_rates` in order. If the sequence runs out, the last supplied
/// rate is held for the remaining windows.
pub fn arm_adjustment_windows(
    details: &ArmDetails,
    initial_rate: Rate,
    term_months: u32,
) -> Vec<PaymentPhase> {
    let freq_months = details.adjustment_frequency_years * 12;
    let mut phases = Vec::new();
    let mut month = (details.initial_period_years * 12).min(term_months);
    let mut current_rate = initial_rate;

    for window in 0.. {
        if month >= term_months {
            break;
        }
        if let Some(rate) = details.expected_rates.get(window) {
            current_rate = *rate;
        }
        let duration = freq_months.min(term_months - month);
        phases.push(PaymentPhase::amortizing(duration, current_rate));
        month += duration;
    }

    phases
}

/// Derive the ordered phase sequence for a loan. Durations always sum to
/// exactly `loan_term_years * 12`.
pub fn resolve_phases(spec: &LoanSpec) -> Vec<PaymentPhase> {
    let term_months = spec.term_months();

    match spec.loan_type {
        LoanType::Conventional => {
            vec![PaymentPhase::amortizing(term_months, spec.interest_rate)]
        }

        LoanType::Arm => {
            let Some(details) = &spec.arm_details else {
                // Validation guarantees details; degrade to fixed-rate.
                return vec![PaymentPhase::amortizing(term_months, spec.interest_rate)];
            };
            let initial_months = (details.initial_period_years * 12).min(term_months);
            let mut phases = vec![PaymentPhase::amortizing(initial_months, spec.interest_rate)];
            phases.extend(arm_adjustment_windows(details, spec.interest_rate, term_months));
            phases
        }

        LoanType::InterestOnly => {
            let Some(details) = &spec.interest_only_details else {
                return vec![PaymentPhase::interest_only(term_months, spec.interest_rate)];
            };
            let declared_months = (details.interest_only_period_years * 12).min(term_months);
            let mut phases = vec![PaymentPhase::interest_only(declared_months, spec.interest_rate)];
            // No amortizing phase for this type: the remainder continues
            // interest-only at the same rate and the principal balloons at
            // term end.
            if declared_months < term_months {
                phases.push(PaymentPhase::interest_only(
                    term_months - declared_months,
                    spec.interest_rate,
                ));
            }
            phases
        }

        LoanType::InterestOnlyHybrid => {
            let Some(details) = &spec.interest_only_details else {
                return vec![PaymentPhase::amortizing(term_months, spec.interest_rate)];
            };
            let io_months = (details.interest_only_period_years * 12).min(term_months);
            let amortizing_rate = details.transition_rate.unwrap_or(spec.interest_rate);
            let mut phases = vec![PaymentPhase::interest_only(io_months, spec.interest_rate)];
            if io_months < term_months {
                phases.push(PaymentPhase::amortizing(
                    term_months - io_months,
                    amortizing_rate,
                ));
            }
            phases
        }
    }
}
