use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::loan::{LoanSpec, LoanType};
use crate::phases::PaymentKind;
use crate::schedule::{AmortizationEntry, ScheduleOutput};
use crate::time_value::{monthly_rate, npv};
use crate::types::{Money, Rate};
use crate::MortgageResult;

/// Down-payment fraction at or above which PMI is not charged.
const PMI_CUTOFF: Decimal = dec!(0.20);

/// Representative monthly payment per phase kind, plus the simple overall
/// average used for cross-structure comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyPaymentSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_only: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amortizing: Option<Money>,
    pub overall: Money,
}

/// Informational monthly carrying costs alongside the loan payment.
/// Outside the amortization math by design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarryingCosts {
    pub property_tax: Money,
    pub insurance: Money,
    pub pmi: Money,
    pub total: Money,
}

/// Echo of the validated spec plus derived fields, as surfaced to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanDetails {
    pub loan_type: LoanType,
    pub home_price: Money,
    pub down_payment: Money,
    pub down_payment_pct: Rate,
    pub loan_amount: Money,
    pub interest_rate: Rate,
    pub loan_term_years: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_only_period_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_rate: Option<Rate>,
    pub risk_free_rate: Rate,
    pub tax_bracket: Rate,
    pub monthly_carrying_costs: CarryingCosts,
}

/// Complete result of one calculation request. Immutable once produced;
/// held only inside the scenario store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanResult {
    pub scenario_name: String,
    pub loan_details: LoanDetails,
    pub monthly_payment: MonthlyPaymentSummary,
    pub total_interest: Money,
    /// All cash out over the loan's life, including extra principal and any
    /// terminal balloon.
    pub total_payments: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balloon_payment: Option<Money>,
    /// Discounted value of the payment stream less the amount borrowed,
    /// at the risk-free rate.
    pub npv: Money,
    pub tax_savings: Money,
    pub effective_cost: Money,
    pub amortization_schedule: Vec<AmortizationEntry>,
}

fn average_payment(entries: &[AmortizationEntry], kind: PaymentKind) -> Option<Money> {
    let payments: Vec<Money> = entries
        .iter()
        .filter(|e| e.payment_phase == kind)
        .map(|e| e.monthly_payment)
        .collect();
    if payments.is_empty() {
        return None;
    }
    let sum: Money = payments.iter().sum();
    Some(sum / Decimal::from(payments.len() as u64))
}

fn carrying_costs(spec: &LoanSpec) -> CarryingCosts {
    let twelve = dec!(12);
    let percent = dec!(100);
    let property_tax = spec.home_price * spec.property_tax_rate / percent / twelve;
    let insurance = spec.insurance_cost / twelve;
    let down_fraction = spec.down_payment / spec.home_price;
    let pmi = if down_fraction < PMI_CUTOFF {
        spec.loan_amount * spec.pmi_rate / percent / twelve
    } else {
        Decimal::ZERO
    };
    CarryingCosts {
        property_tax,
        insurance,
        pmi,
        total: property_tax + insurance + pmi,
    }
}

/// Compute valuation metrics from a finished schedule.
///
/// The balloon principal, when present, is counted once in `total_payments`
/// and discounted at its month for NPV, but never appears in the
/// `principal_payment` series.
pub fn evaluate(spec: &LoanSpec, schedule: ScheduleOutput) -> MortgageResult<LoanResult> {
    let ScheduleOutput {
        entries,
        balloon_payment,
    } = schedule;

    let months = entries.len() as u64;
    let total_interest: Money = entries.iter().map(|e| e.interest_payment).sum();
    let payments_sum: Money = entries.iter().map(|e| e.monthly_payment).sum();
    let total_payments = payments_sum + balloon_payment.unwrap_or(Decimal::ZERO);

    let overall = if months > 0 {
        total_payments / Decimal::from(months)
    } else {
        Decimal::ZERO
    };

    let monthly_payment = MonthlyPaymentSummary {
        interest_only: average_payment(&entries, PaymentKind::InterestOnly),
        amortizing: average_payment(&entries, PaymentKind::Amortizing),
        overall,
    };

    // NPV of the payment stream from the lender's perspective: the amount
    // lent out at t = 0, then every monthly payment discounted at the
    // risk-free rate. With rf = 0 this degenerates to
    // total_payments - loan_amount.
    let discount_rate = monthly_rate(spec.risk_free_rate);
    let mut cash_flows: Vec<Money> = Vec::with_capacity(entries.len() + 1);
    cash_flows.push(-spec.loan_amount);
    for entry in &entries {
        cash_flows.push(entry.monthly_payment);
    }
    if let Some(balloon) = balloon_payment {
        if let Some(last) = cash_flows.last_mut() {
            *last += balloon;
        }
    }
    let npv_value = npv(discount_rate, &cash_flows)?;

    let tax_savings = total_interest * spec.tax_bracket;
    let effective_cost = total_payments - tax_savings;

    let loan_details = LoanDetails {
        loan_type: spec.loan_type,
        home_price: spec.home_price,
        down_payment: spec.down_payment,
        down_payment_pct: spec.down_payment / spec.home_price * dec!(100),
        loan_amount: spec.loan_amount,
        interest_rate: spec.interest_rate,
        loan_term_years: spec.loan_term_years,
        interest_only_period_years: spec
            .interest_only_details
            .as_ref()
            .map(|d| d.interest_only_period_years),
        transition_rate: spec
            .interest_only_details
            .as_ref()
            .and_then(|d| d.transition_rate),
        risk_free_rate: spec.risk_free_rate,
        tax_bracket: spec.tax_bracket,
        monthly_carrying_costs: carrying_costs(spec),
    };

    Ok(LoanResult {
        scenario_name: spec.scenario_name.clone(),
        loan_details,
        monthly_payment,
        total_interest,
        total_payments,
        balloon_payment,
        npv: npv_value,
        tax_savings,
        effective_cost,
        amortization_schedule: entries,
    })
}
