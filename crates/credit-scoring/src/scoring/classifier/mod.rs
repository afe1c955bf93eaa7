mod forest;

pub use forest::{
    DecisionTree, ForestArtifact, ModelSummary, RandomForestClassifier, TreeArtifact,
};

use std::path::PathBuf;

/// Inference boundary. Implementations are loaded once and only ever read afterwards, so they
/// can be shared across request handlers without locking.
pub trait CreditClassifier: Send + Sync {
    /// Width of the feature vector the model was trained on.
    fn expected_features(&self) -> usize;

    /// Discrete class label for one sample.
    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError>;

    /// Per-class probabilities for one sample, ordered like the training classes.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;

    /// Structural description for operators, when the implementation has one.
    fn summary(&self) -> Option<ModelSummary> {
        None
    }
}

/// Raised when the serialized classifier cannot be turned into a usable model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model artifact {path} could not be read: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact {path} is not a valid forest: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("model artifact is inconsistent: {0}")]
    Inconsistent(String),
}

/// Raised by a single inference call; terminal for that request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("expected {expected} features, received {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("feature {index} is not a finite number")]
    NonFiniteFeature { index: usize },
    #[error("tree {tree} did not reach a leaf")]
    UnterminatedTree { tree: usize },
    #[error("classifier returned an unusable probability: {0}")]
    InvalidProbability(f64),
    #[error("classifier returned {actual} class probabilities, expected at least {expected}")]
    MissingClass { expected: usize, actual: usize },
}
