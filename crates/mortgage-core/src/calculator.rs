//! Top-level entry points running the full pipeline: validate, resolve
//! phases, generate the schedule, evaluate.

use std::time::Instant;

use crate::loan::{validate_request, LoanRequest, LoanSpec};
use crate::phases::resolve_phases;
use crate::schedule::generate_schedule;
use crate::types::{with_metadata, ComputationOutput};
use crate::valuation::{evaluate, LoanResult};
use crate::MortgageResult;

/// Compute the full result for a validated spec.
pub fn calculate_loan(spec: &LoanSpec) -> MortgageResult<ComputationOutput<LoanResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let phases = resolve_phases(spec);
    let schedule = generate_schedule(spec, &phases)?;

    if let Some(balloon) = schedule.balloon_payment {
        warnings.push(format!(
            "Balloon payment of {} due at month {}",
            balloon.round_dp(2),
            spec.term_months()
        ));
    }
    if (schedule.entries.len() as u32) < spec.term_months() {
        warnings.push(format!(
            "Loan retired early at month {} of {}",
            schedule.entries.len(),
            spec.term_months()
        ));
    }

    let result = evaluate(spec, schedule)?;
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Phase-Based Amortization with Discounted Cash Flow Valuation",
        spec,
        warnings,
        elapsed,
        result,
    ))
}

/// Validate a raw request and compute its result.
pub fn calculate_request(request: &LoanRequest) -> MortgageResult<ComputationOutput<LoanResult>> {
    let spec = validate_request(request)?;
    calculate_loan(&spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{InterestOnlyDetails, LoanRequest};
    use rust_decimal_macros::dec;

    #[test]
    fn test_envelope_populated() {
        let request = LoanRequest {
            home_price: Some(dec!(400000)),
            down_payment: Some(dec!(80000)),
            interest_rate: Some(dec!(6.0)),
            loan_term_years: Some(30),
            loan_type: Some("conventional".into()),
            ..Default::default()
        };
        let output = calculate_request(&request).unwrap();
        assert!(output.methodology.contains("Amortization"));
        assert_eq!(output.metadata.precision, "rust_decimal_128bit");
        assert!(output.warnings.is_empty());
        assert_eq!(output.result.amortization_schedule.len(), 360);
    }

    #[test]
    fn test_balloon_warning_surfaced() {
        let request = LoanRequest {
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
        };
        let output = calculate_request(&request).unwrap();
        assert_eq!(output.warnings.len(), 1);
        assert!(output.warnings[0].contains("Balloon"));
    }

    #[test]
    fn test_validation_error_propagates() {
        let request = LoanRequest::default();
        assert!(calculate_request(&request).is_err());
    }
}
