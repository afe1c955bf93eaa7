use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::scoring::classifier::{
    CreditClassifier, ForestArtifact, InferenceError, RandomForestClassifier, TreeArtifact,
};
use crate::scoring::domain::{ApplicationInput, FEATURE_COUNT};
use crate::scoring::predictor::CreditPredictor;
use crate::scoring::service::ScoringService;
use crate::scoring::{scoring_router, CreditApplication};

const LEAF: i64 = -1;
const UNDEFINED: i64 = -2;

/// Splits on cash flow at 100,000.
pub(super) fn cash_flow_tree() -> TreeArtifact {
    TreeArtifact {
        children_left: vec![1, LEAF, LEAF],
        children_right: vec![2, LEAF, LEAF],
        feature: vec![3, UNDEFINED, UNDEFINED],
        threshold: vec![100_000.0, -2.0, -2.0],
        value: vec![vec![9.0, 11.0], vec![1.0, 9.0], vec![8.0, 2.0]],
    }
}

/// Splits on guarantee first, then on the requested amount at 5,000,000.
pub(super) fn guarantee_tree() -> TreeArtifact {
    TreeArtifact {
        children_left: vec![1, LEAF, 3, LEAF, LEAF],
        children_right: vec![2, LEAF, 4, LEAF, LEAF],
        feature: vec![6, UNDEFINED, 4, UNDEFINED, UNDEFINED],
        threshold: vec![0.5, -2.0, 5_000_000.0, -2.0, -2.0],
        value: vec![
            vec![16.0, 14.0],
            vec![3.0, 7.0],
            vec![13.0, 7.0],
            vec![9.0, 1.0],
            vec![4.0, 6.0],
        ],
    }
}

pub(super) fn forest_artifact() -> ForestArtifact {
    ForestArtifact {
        n_features: FEATURE_COUNT,
        classes: vec![0, 1],
        feature_names: Vec::new(),
        trees: vec![cash_flow_tree(), guarantee_tree()],
    }
}

pub(super) fn forest() -> RandomForestClassifier {
    RandomForestClassifier::from_artifact(forest_artifact()).expect("fixture forest is valid")
}

pub(super) fn predictor() -> CreditPredictor<RandomForestClassifier> {
    CreditPredictor::new(Arc::new(forest()))
}

/// age 35, income 300,000, expenses 100,000, 12 months, 2,000,000 requested, personal guarantee.
pub(super) fn reference_input() -> ApplicationInput {
    ApplicationInput {
        age: 35,
        monthly_income: 300_000.0,
        monthly_expenses: 100_000.0,
        term_months: 12,
        requested_amount: 2_000_000.0,
        guarantee: "personal".to_string(),
    }
}

/// Thin margin and no collateral; the fixture forest rejects it.
pub(super) fn risky_input() -> ApplicationInput {
    ApplicationInput {
        monthly_income: 100_000.0,
        monthly_expenses: 90_000.0,
        guarantee: "none".to_string(),
        ..reference_input()
    }
}

pub(super) fn application(input: &ApplicationInput) -> CreditApplication {
    CreditApplication::from_input(input).expect("fixture input is valid")
}

pub(super) fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}

pub(super) fn missing_logo() -> PathBuf {
    PathBuf::from("definitely-not-here/logo_3dc.png")
}

pub(super) fn service_with<C>(classifier: Arc<C>) -> ScoringService<C>
where
    C: CreditClassifier + ?Sized,
{
    ScoringService::new(CreditPredictor::new(classifier), missing_logo())
}

pub(super) fn router_with<C>(classifier: Arc<C>) -> axum::Router
where
    C: CreditClassifier + ?Sized + 'static,
{
    scoring_router(Arc::new(service_with(classifier)))
}

/// Returns a fixed answer and counts how often it was asked.
pub(super) struct StubClassifier {
    label: i64,
    proba: Vec<f64>,
    calls: AtomicUsize,
}

impl StubClassifier {
    pub(super) fn new(label: i64, proba: Vec<f64>) -> Self {
        Self {
            label,
            proba,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CreditClassifier for StubClassifier {
    fn expected_features(&self) -> usize {
        FEATURE_COUNT
    }

    fn predict(&self, _features: &[f64]) -> Result<i64, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.label)
    }

    fn predict_proba(&self, _features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        Ok(self.proba.clone())
    }
}

/// Behaves like a model trained on a different column count.
pub(super) struct FailingClassifier;

impl CreditClassifier for FailingClassifier {
    fn expected_features(&self) -> usize {
        FEATURE_COUNT - 1
    }

    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError> {
        Err(InferenceError::ShapeMismatch {
            expected: FEATURE_COUNT - 1,
            actual: features.len(),
        })
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        Err(InferenceError::ShapeMismatch {
            expected: FEATURE_COUNT - 1,
            actual: features.len(),
        })
    }
}

pub(super) fn temp_artifact(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "credit-scoring-{}-{name}.json",
        std::process::id()
    ));
    std::fs::write(&path, contents).expect("write temp artifact");
    path
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
