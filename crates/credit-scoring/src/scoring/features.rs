use super::domain::{ApplicationInput, CreditApplication, FeatureVector, GuaranteeType};

/// Share of net monthly income considered available for repayment.
pub const CASH_FLOW_SHARE: f64 = 0.7;

/// Rejections raised before anything reaches the classifier.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("unknown guarantee type '{value}' (expected none, personal or real)")]
    UnknownGuarantee { value: String },
}

impl InputError {
    pub fn field(&self) -> &'static str {
        match self {
            InputError::OutOfRange { field, .. } | InputError::NotFinite { field } => field,
            InputError::UnknownGuarantee { .. } => "guarantee",
        }
    }
}

/// 70% of net monthly income, rounded to two decimals. Negative when expenses exceed income.
pub fn compute_cash_flow(income: f64, expenses: f64) -> f64 {
    round_to_cents(CASH_FLOW_SHARE * (income - expenses))
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn encode_guarantee(raw: &str) -> Result<u8, InputError> {
    raw.parse::<GuaranteeType>().map(GuaranteeType::ordinal)
}

/// Validate every field and lay the result out in training column order.
pub fn build_feature_vector(input: &ApplicationInput) -> Result<FeatureVector, InputError> {
    CreditApplication::from_input(input).map(|application| application.feature_vector())
}
