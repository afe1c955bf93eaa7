use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::classifier::{CreditClassifier, InferenceError, ModelError, RandomForestClassifier};
use super::domain::{ApplicationInput, CreditApplication, FeatureVector};
use super::features::InputError;

/// Model output meaning "credit approved". Every other label is a rejection.
pub const APPROVED_LABEL: i64 = 0;

/// Position of the rejection class in `predict_proba` output.
pub const REJECTION_CLASS_INDEX: usize = 1;

/// Verdict derived from the classifier label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditDecision {
    Approved,
    Rejected,
}

impl CreditDecision {
    pub fn from_label(label: i64) -> Self {
        if label == APPROVED_LABEL {
            Self::Approved
        } else {
            Self::Rejected
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CreditDecision::Approved => "approved",
            CreditDecision::Rejected => "rejected",
        }
    }

    pub const fn headline(self) -> &'static str {
        match self {
            CreditDecision::Approved => "Crédit validé",
            CreditDecision::Rejected => "Crédit non validé",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: CreditDecision,
    pub rejection_probability: f64,
}

impl PredictionResult {
    pub fn approved(&self) -> bool {
        self.label == CreditDecision::Approved
    }
}

/// Validated application together with the vector that was scored and the verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub application: CreditApplication,
    pub features: FeatureVector,
    pub result: PredictionResult,
}

/// Everything that can end a prediction request. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    #[error("model unavailable: {0}")]
    ModelUnavailable(#[from] ModelError),
    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
}

/// Facade over an injected, read-only classifier.
pub struct CreditPredictor<C: ?Sized> {
    classifier: Arc<C>,
}

impl<C: ?Sized> Clone for CreditPredictor<C> {
    fn clone(&self) -> Self {
        Self {
            classifier: Arc::clone(&self.classifier),
        }
    }
}

impl CreditPredictor<RandomForestClassifier> {
    /// Load the forest artifact. A missing or corrupt file means no predictor at all.
    pub fn from_artifact(path: impl AsRef<Path>) -> Result<Self, PredictionError> {
        let forest = RandomForestClassifier::from_path(path)?;
        Ok(Self::new(Arc::new(forest)))
    }
}

impl<C> CreditPredictor<C>
where
    C: CreditClassifier + ?Sized,
{
    pub fn new(classifier: Arc<C>) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Score an already assembled feature vector.
    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult, PredictionError> {
        self.predict_slice(features.as_slice())
    }

    pub(crate) fn predict_slice(
        &self,
        features: &[f64],
    ) -> Result<PredictionResult, PredictionError> {
        let outcome = self.infer(features);
        if let Err(err) = &outcome {
            warn!(error = %err, width = features.len(), "classifier call failed");
        }
        let (label, rejection_probability) = outcome?;

        let result = PredictionResult {
            label: CreditDecision::from_label(label),
            rejection_probability,
        };
        debug!(
            decision = result.label.label(),
            rejection_probability, "credit prediction completed"
        );
        Ok(result)
    }

    fn infer(&self, features: &[f64]) -> Result<(i64, f64), InferenceError> {
        let label = self.classifier.predict(features)?;
        let proba = self.classifier.predict_proba(features)?;

        let rejection_probability = match proba.get(REJECTION_CLASS_INDEX) {
            Some(probability) => *probability,
            None => {
                return Err(InferenceError::MissingClass {
                    expected: REJECTION_CLASS_INDEX + 1,
                    actual: proba.len(),
                })
            }
        };

        if !(0.0..=1.0).contains(&rejection_probability) {
            return Err(InferenceError::InvalidProbability(rejection_probability));
        }

        Ok((label, rejection_probability))
    }

    /// Validate raw input, assemble the vector, and score it in one step.
    pub fn assess(&self, input: &ApplicationInput) -> Result<Assessment, PredictionError> {
        let application = CreditApplication::from_input(input)?;
        let features = application.feature_vector();
        let result = self.predict(&features)?;

        Ok(Assessment {
            application,
            features,
            result,
        })
    }
}
