use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::MortgageError;
use crate::types::{Money, Rate};
use crate::MortgageResult;

/// Default annual property tax as a percentage of home price.
const DEFAULT_PROPERTY_TAX_RATE: Decimal = dec!(1.1);

/// Default annual homeowner's insurance cost.
const DEFAULT_INSURANCE_COST: Decimal = dec!(1200);

/// Default annual PMI as a percentage of the loan amount.
const DEFAULT_PMI_RATE: Decimal = dec!(0.5);

const DEFAULT_SCENARIO_NAME: &str = "Default Scenario";

/// Longest loan term accepted. Bounds every year-to-month conversion so the
/// arithmetic stays well inside u32.
const MAX_TERM_YEARS: u32 = 100;

/// Loan structure. Closed set: phase resolution differs structurally per
/// variant but all variants share the same schedule and valuation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    Conventional,
    Arm,
    InterestOnly,
    InterestOnlyHybrid,
}

impl LoanType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "conventional" => Some(LoanType::Conventional),
            "arm" => Some(LoanType::Arm),
            "interest_only" => Some(LoanType::InterestOnly),
            "interest_only_hybrid" => Some(LoanType::InterestOnlyHybrid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::Conventional => "conventional",
            LoanType::Arm => "arm",
            LoanType::InterestOnly => "interest_only",
            LoanType::InterestOnlyHybrid => "interest_only_hybrid",
        }
    }

    pub fn is_interest_only(&self) -> bool {
        matches!(self, LoanType::InterestOnly | LoanType::InterestOnlyHybrid)
    }
}

/// Adjustable-rate mortgage parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmDetails {
    /// Years at the initial fixed rate before the first adjustment.
    pub initial_period_years: u32,
    /// Years between rate adjustments.
    pub adjustment_frequency_years: u32,
    /// Caller-supplied annual rates (percentages), one per adjustment
    /// window in order. Future rates are inputs, never fetched.
    pub expected_rates: Vec<Rate>,
}

/// Interest-only loan parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestOnlyDetails {
    /// Years of interest-only payments.
    pub interest_only_period_years: u32,
    /// Annual rate (percentage) applied after the transition to amortizing
    /// payments. When absent the current rate is reused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_rate: Option<Rate>,
}

/// Raw calculation request as received over the JSON boundary. Every field
/// is optional so validation can report the offending field by name instead
/// of failing opaquely at deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoanRequest {
    pub scenario_name: Option<String>,
    pub home_price: Option<Decimal>,
    pub down_payment: Option<Decimal>,
    pub interest_rate: Option<Decimal>,
    pub loan_term_years: Option<u32>,
    pub loan_type: Option<String>,
    pub tax_bracket: Option<Decimal>,
    pub risk_free_rate: Option<Decimal>,
    pub property_tax_rate: Option<Decimal>,
    pub insurance_cost: Option<Decimal>,
    pub pmi_rate: Option<Decimal>,
    pub arm_details: Option<ArmDetails>,
    pub interest_only_details: Option<InterestOnlyDetails>,
    /// Extra principal by 1-indexed month.
    pub extra_payments: Option<BTreeMap<u32, Decimal>>,
}

/// Validated, immutable loan specification. Created once per calculation
/// request; all rates are annual percentages.
#[derive(Debug, Clone, Serialize)]
pub struct LoanSpec {
    pub scenario_name: String,
    pub home_price: Money,
    pub down_payment: Money,
    pub loan_amount: Money,
    pub interest_rate: Rate,
    pub loan_term_years: u32,
    pub loan_type: LoanType,
    /// Marginal income-tax rate as a fraction in [0, 1).
    pub tax_bracket: Rate,
    /// Annual percentage used as the NPV discount rate.
    pub risk_free_rate: Rate,
    pub property_tax_rate: Rate,
    pub insurance_cost: Money,
    pub pmi_rate: Rate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arm_details: Option<ArmDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_only_details: Option<InterestOnlyDetails>,
    pub extra_payments: BTreeMap<u32, Money>,
}

impl LoanSpec {
    pub fn term_months(&self) -> u32 {
        self.loan_term_years * 12
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> MortgageError {
    MortgageError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}

fn require<T: Clone>(value: &Option<T>, field: &str) -> MortgageResult<T> {
    value.clone().ok_or_else(|| invalid(field, "Field is required"))
}

/// Number of ARM adjustment windows implied by the term, initial period and
/// adjustment frequency (last window truncated to the remaining term).
fn implied_adjustment_windows(details: &ArmDetails, term_months: u32) -> u32 {
    let initial_months = details.initial_period_years * 12;
    let freq_months = details.adjustment_frequency_years * 12;
    if term_months <= initial_months || freq_months == 0 {
        return 0;
    }
    (term_months - initial_months).div_ceil(freq_months)
}

/// Validate a raw request into a `LoanSpec`, applying documented defaults.
/// No side effects; errors name the offending field.
pub fn validate_request(request: &LoanRequest) -> MortgageResult<LoanSpec> {
    let home_price = require(&request.home_price, "home_price")?;
    if home_price <= Decimal::ZERO {
        return Err(invalid("home_price", "Home price must be positive"));
    }

    let down_payment = require(&request.down_payment, "down_payment")?;
    if down_payment < Decimal::ZERO {
        return Err(invalid("down_payment", "Down payment cannot be negative"));
    }
    if down_payment >= home_price {
        return Err(invalid(
            "down_payment",
            "Down payment must be less than the home price",
        ));
    }

    let interest_rate = require(&request.interest_rate, "interest_rate")?;
    if interest_rate < Decimal::ZERO {
        return Err(invalid("interest_rate", "Interest rate cannot be negative"));
    }

    let loan_term_years = require(&request.loan_term_years, "loan_term_years")?;
    if loan_term_years == 0 {
        return Err(invalid(
            "loan_term_years",
            "Loan term must be a positive number of years",
        ));
    }
    if loan_term_years > MAX_TERM_YEARS {
        return Err(invalid(
            "loan_term_years",
            format!("Loan term cannot exceed {MAX_TERM_YEARS} years"),
        ));
    }
    let term_months = loan_term_years * 12;

    let loan_type_raw = require(&request.loan_type, "loan_type")?;
    let loan_type = LoanType::parse(&loan_type_raw).ok_or_else(|| {
        invalid(
            "loan_type",
            format!(
                "Unrecognized loan type '{loan_type_raw}'; expected one of \
                 conventional, arm, interest_only, interest_only_hybrid"
            ),
        )
    })?;

    let tax_bracket = request.tax_bracket.unwrap_or(Decimal::ZERO);
    if tax_bracket < Decimal::ZERO || tax_bracket >= Decimal::ONE {
        return Err(invalid(
            "tax_bracket",
            "Tax bracket must be a fraction in [0, 1)",
        ));
    }

    let risk_free_rate = request.risk_free_rate.unwrap_or(Decimal::ZERO);
    if risk_free_rate < Decimal::ZERO {
        return Err(invalid("risk_free_rate", "Risk-free rate cannot be negative"));
    }

    let property_tax_rate = request.property_tax_rate.unwrap_or(DEFAULT_PROPERTY_TAX_RATE);
    if property_tax_rate < Decimal::ZERO {
        return Err(invalid(
            "property_tax_rate",
            "Property tax rate cannot be negative",
        ));
    }

    let insurance_cost = request.insurance_cost.unwrap_or(DEFAULT_INSURANCE_COST);
    if insurance_cost < Decimal::ZERO {
        return Err(invalid("insurance_cost", "Insurance cost cannot be negative"));
    }

    let pmi_rate = request.pmi_rate.unwrap_or(DEFAULT_PMI_RATE);
    if pmi_rate < Decimal::ZERO {
        return Err(invalid("pmi_rate", "PMI rate cannot be negative"));
    }

    // Structure-specific details are required iff the loan type needs them.
    let arm_details = match (loan_type, &request.arm_details) {
        (LoanType::Arm, Some(details)) => {
            validate_arm_details(details, loan_term_years)?;
            Some(details.clone())
        }
        (LoanType::Arm, None) => {
            return Err(invalid("arm_details", "Required for ARM loans"));
        }
        (_, Some(_)) => {
            return Err(invalid("arm_details", "Only valid for ARM loans"));
        }
        (_, None) => None,
    };

    let interest_only_details = match (loan_type, &request.interest_only_details) {
        (LoanType::InterestOnly | LoanType::InterestOnlyHybrid, Some(details)) => {
            validate_interest_only_details(details, loan_type, loan_term_years)?;
            Some(details.clone())
        }
        (LoanType::InterestOnly | LoanType::InterestOnlyHybrid, None) => {
            return Err(invalid(
                "interest_only_details",
                "Required for interest-only loans",
            ));
        }
        (_, Some(_)) => {
            return Err(invalid(
                "interest_only_details",
                "Only valid for interest-only loans",
            ));
        }
        (_, None) => None,
    };

    let extra_payments = request.extra_payments.clone().unwrap_or_default();
    for (&month, &amount) in &extra_payments {
        if month == 0 || month > term_months {
            return Err(invalid(
                "extra_payments",
                format!("Month {month} is outside the loan term (1..={term_months})"),
            ));
        }
        if amount < Decimal::ZERO {
            return Err(invalid(
                "extra_payments",
                format!("Extra payment at month {month} cannot be negative"),
            ));
        }
    }

    Ok(LoanSpec {
        scenario_name: request
            .scenario_name
            .clone()
            .unwrap_or_else(|| DEFAULT_SCENARIO_NAME.to_string()),
        home_price,
        down_payment,
        loan_amount: home_price - down_payment,
        interest_rate,
        loan_term_years,
        loan_type,
        tax_bracket,
        risk_free_rate,
        property_tax_rate,
        insurance_cost,
        pmi_rate,
        arm_details,
        interest_only_details,
        extra_payments,
    })
}

fn validate_arm_details(details: &ArmDetails, loan_term_years: u32) -> MortgageResult<()> {
    // Year-level bounds first: the month conversions below rely on every
    // period fitting inside the (already bounded) loan term.
    if details.initial_period_years == 0 {
        return Err(invalid(
            "arm_details.initial_period_years",
            "Initial fixed period must be at least one year",
        ));
    }
    if details.initial_period_years > loan_term_years {
        return Err(invalid(
            "arm_details.initial_period_years",
            "Initial fixed period cannot exceed the loan term",
        ));
    }
    if details.adjustment_frequency_years == 0 {
        return Err(invalid(
            "arm_details.adjustment_frequency_years",
            "Adjustment frequency must be at least one year",
        ));
    }
    if details.adjustment_frequency_years > loan_term_years {
        return Err(invalid(
            "arm_details.adjustment_frequency_years",
            "Adjustment frequency cannot exceed the loan term",
        ));
    }

    // One rate per implied window; missing entries are an error, not a
    // silent default.
    let windows = implied_adjustment_windows(details, loan_term_years * 12);
    if (details.expected_rates.len() as u32) < windows {
        return Err(invalid(
            "arm_details.expected_rates",
            format!(
                "Expected {} rates (one per adjustment window), got {}",
                windows,
                details.expected_rates.len()
            ),
        ));
    }
    for (i, rate) in details.expected_rates.iter().enumerate() {
        if *rate < Decimal::ZERO {
            return Err(invalid(
                "arm_details.expected_rates",
                format!("Rate at index {i} cannot be negative"),
            ));
        }
    }
    Ok(())
}

fn validate_interest_only_details(
    details: &InterestOnlyDetails,
    loan_type: LoanType,
    loan_term_years: u32,
) -> MortgageResult<()> {
    if details.interest_only_period_years == 0 {
        return Err(invalid(
            "interest_only_details.interest_only_period_years",
            "Interest-only period must be at least one year",
        ));
    }
    match loan_type {
        // Hybrid loans need a trailing amortizing phase.
        LoanType::InterestOnlyHybrid => {
            if details.interest_only_period_years >= loan_term_years {
                return Err(invalid(
                    "interest_only_details.interest_only_period_years",
                    "Interest-only period must be shorter than the loan term",
                ));
            }
        }
        _ => {
            if details.interest_only_period_years > loan_term_years {
                return Err(invalid(
                    "interest_only_details.interest_only_period_years",
                    "Interest-only period cannot exceed the loan term",
                ));
            }
        }
    }
    if let Some(rate) = details.transition_rate {
        if rate < Decimal::ZERO {
            return Err(invalid(
                "interest_only_details.transition_rate",
                "Transition rate cannot be negative",
            ));
        }
    }
    Ok(())
}
