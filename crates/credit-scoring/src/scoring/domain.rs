use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::features::{compute_cash_flow, InputError};

pub const AGE_RANGE: RangeInclusive<i64> = 18..=70;
pub const TERM_MONTHS_RANGE: RangeInclusive<i64> = 6..=36;
pub const MONTHLY_INCOME_RANGE: RangeInclusive<f64> = 50_000.0..=2_000_000.0;
pub const MONTHLY_EXPENSES_RANGE: RangeInclusive<f64> = 10_000.0..=1_500_000.0;
pub const REQUESTED_AMOUNT_RANGE: RangeInclusive<f64> = 50_000.0..=20_000_000.0;

/// Number of columns the classifier was trained on.
pub const FEATURE_COUNT: usize = 7;

/// Training column order. The classifier is positional, so this order is a hard contract.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "monthly_income",
    "monthly_expenses",
    "cash_flow",
    "requested_amount",
    "term_months",
    "guarantee",
];

/// Collateral category backing the loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuaranteeType {
    #[serde(alias = "aucune")]
    None,
    #[serde(alias = "personnelle")]
    Personal,
    #[serde(alias = "réelle", alias = "reelle")]
    Real,
}

impl GuaranteeType {
    pub const ALL: [GuaranteeType; 3] = [Self::None, Self::Personal, Self::Real];

    /// Ordinal the classifier was trained with.
    pub const fn ordinal(self) -> u8 {
        match self {
            GuaranteeType::None => 0,
            GuaranteeType::Personal => 1,
            GuaranteeType::Real => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            GuaranteeType::None => "aucune",
            GuaranteeType::Personal => "personnelle",
            GuaranteeType::Real => "réelle",
        }
    }
}

impl FromStr for GuaranteeType {
    type Err = InputError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "none" | "aucune" => Ok(Self::None),
            "personal" | "personnelle" => Ok(Self::Personal),
            "real" | "réelle" | "reelle" => Ok(Self::Real),
            _ => Err(InputError::UnknownGuarantee {
                value: raw.to_string(),
            }),
        }
    }
}

impl fmt::Display for GuaranteeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw applicant attributes as they arrive from a form, a JSON body, or CLI flags.
///
/// Nothing here is trusted: [`CreditApplication::from_input`] is the only way to obtain a value
/// the predictor will accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationInput {
    pub age: i64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub term_months: i64,
    pub requested_amount: f64,
    pub guarantee: String,
}

impl Default for ApplicationInput {
    fn default() -> Self {
        Self {
            age: 35,
            monthly_income: 300_000.0,
            monthly_expenses: 100_000.0,
            term_months: 12,
            requested_amount: 2_000_000.0,
            guarantee: GuaranteeType::None.label().to_string(),
        }
    }
}

/// Validated application with its derived cash flow.
///
/// Fields are private so the cash flow can only ever be the one computed from the current
/// income and expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditApplication {
    age: u8,
    monthly_income: f64,
    monthly_expenses: f64,
    term_months: u8,
    requested_amount: f64,
    guarantee: GuaranteeType,
    cash_flow: f64,
}

impl CreditApplication {
    pub fn from_input(input: &ApplicationInput) -> Result<Self, InputError> {
        let age = check_integer("age", input.age, AGE_RANGE)?;
        let monthly_income =
            check_amount("monthly_income", input.monthly_income, MONTHLY_INCOME_RANGE)?;
        let monthly_expenses = check_amount(
            "monthly_expenses",
            input.monthly_expenses,
            MONTHLY_EXPENSES_RANGE,
        )?;
        let term_months = check_integer("term_months", input.term_months, TERM_MONTHS_RANGE)?;
        let requested_amount = check_amount(
            "requested_amount",
            input.requested_amount,
            REQUESTED_AMOUNT_RANGE,
        )?;
        let guarantee = input.guarantee.parse::<GuaranteeType>()?;

        Ok(Self {
            age,
            monthly_income,
            monthly_expenses,
            term_months,
            requested_amount,
            guarantee,
            cash_flow: compute_cash_flow(monthly_income, monthly_expenses),
        })
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn monthly_income(&self) -> f64 {
        self.monthly_income
    }

    pub fn monthly_expenses(&self) -> f64 {
        self.monthly_expenses
    }

    pub fn term_months(&self) -> u8 {
        self.term_months
    }

    pub fn requested_amount(&self) -> f64 {
        self.requested_amount
    }

    pub fn guarantee(&self) -> GuaranteeType {
        self.guarantee
    }

    pub fn cash_flow(&self) -> f64 {
        self.cash_flow
    }

    /// Income left after expenses, before the 70% haircut.
    pub fn net_income(&self) -> f64 {
        self.monthly_income - self.monthly_expenses
    }

    /// Cash flow accumulated over the whole loan term.
    pub fn cash_flow_over_term(&self) -> f64 {
        self.cash_flow * f64::from(self.term_months)
    }

    pub fn feature_vector(&self) -> FeatureVector {
        FeatureVector([
            f64::from(self.age),
            self.monthly_income,
            self.monthly_expenses,
            self.cash_flow,
            self.requested_amount,
            f64::from(self.term_months),
            f64::from(self.guarantee.ordinal()),
        ])
    }
}

fn check_integer(
    field: &'static str,
    value: i64,
    range: RangeInclusive<i64>,
) -> Result<u8, InputError> {
    if !range.contains(&value) {
        return Err(InputError::OutOfRange {
            field,
            min: *range.start() as f64,
            max: *range.end() as f64,
            value: value as f64,
        });
    }
    u8::try_from(value).map_err(|_| InputError::OutOfRange {
        field,
        min: *range.start() as f64,
        max: *range.end() as f64,
        value: value as f64,
    })
}

fn check_amount(
    field: &'static str,
    value: f64,
    range: RangeInclusive<f64>,
) -> Result<f64, InputError> {
    if !value.is_finite() {
        return Err(InputError::NotFinite { field });
    }
    if !range.contains(&value) {
        return Err(InputError::OutOfRange {
            field,
            min: *range.start(),
            max: *range.end(),
            value,
        });
    }
    Ok(value)
}

/// Ordered classifier input, see [`FEATURE_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}
