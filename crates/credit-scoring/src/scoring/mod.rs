//! Credit application scoring: validation, feature assembly, inference and the dashboard view.

pub mod classifier;
pub mod dashboard;
pub mod domain;
pub mod features;
pub mod predictor;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use classifier::{
    CreditClassifier, ForestArtifact, InferenceError, ModelError, ModelSummary,
    RandomForestClassifier,
};
pub use dashboard::{Branding, DashboardView, PredictionState};
pub use domain::{
    ApplicationInput, CreditApplication, FeatureVector, GuaranteeType, FEATURE_COUNT,
    FEATURE_NAMES,
};
pub use features::{build_feature_vector, compute_cash_flow, encode_guarantee, InputError};
pub use predictor::{
    Assessment, CreditDecision, CreditPredictor, PredictionError, PredictionResult,
};
pub use router::scoring_router;
pub use service::{DashboardRequest, ScoringService};
