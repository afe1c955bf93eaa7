//! End-to-end scenarios through the public facade: load the forest artifact from disk, build the
//! dashboard for a set of form values, and run the prediction.

use std::path::PathBuf;
use std::sync::Arc;

use credit_scoring::scoring::dashboard::PanelStatus;
use credit_scoring::scoring::{
    build_feature_vector, ApplicationInput, Branding, CreditApplication, CreditDecision,
    CreditPredictor, DashboardRequest, DashboardView, PredictionError, PredictionState,
    RandomForestClassifier, ScoringService,
};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/forest.json")
}

fn form_values() -> ApplicationInput {
    ApplicationInput {
        age: 35,
        monthly_income: 300_000.0,
        monthly_expenses: 100_000.0,
        term_months: 12,
        requested_amount: 2_000_000.0,
        guarantee: "personnelle".to_string(),
    }
}

#[test]
fn dashboard_renders_before_and_after_prediction() {
    let predictor = CreditPredictor::from_artifact(fixture_path()).expect("fixture loads");
    let application = CreditApplication::from_input(&form_values()).expect("valid form");

    let mut state = PredictionState::Idle;
    let before = DashboardView::render(&application, &state, Branding::default());
    assert_eq!(before.prediction.status, PanelStatus::Idle);
    assert_eq!(
        before
            .metric("Revenu net")
            .map(ToString::to_string)
            .as_deref(),
        Some("Revenu net: 200,000 FCFA")
    );
    assert_eq!(before.cash_flow_summary, "Cashflow (70%) = 140,000 FCFA");

    let result = state
        .run_prediction(&predictor, &application)
        .expect("prediction succeeds");
    let after = DashboardView::render(&application, &state, Branding::default());

    assert_eq!(result.label, CreditDecision::Approved);
    assert_eq!(after.prediction.status, PanelStatus::Success);
    assert!((result.rejection_probability - 0.15).abs() < 1e-9);
}

#[test]
fn loaded_model_is_shared_read_only_across_threads() {
    let forest = Arc::new(RandomForestClassifier::from_path(fixture_path()).expect("fixture loads"));
    let predictor = CreditPredictor::new(forest);
    let features = build_feature_vector(&form_values()).expect("valid form");

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let predictor = predictor.clone();
            std::thread::spawn(move || predictor.predict(&features).expect("prediction succeeds"))
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread completes"))
        .collect();
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn service_refuses_to_exist_without_model() {
    let missing = fixture_path().with_file_name("absent.json");

    match CreditPredictor::from_artifact(&missing) {
        Err(PredictionError::ModelUnavailable(err)) => {
            assert!(err.to_string().contains("absent.json"));
        }
        Err(other) => panic!("expected model unavailable, got {other:?}"),
        Ok(_) => panic!("no predictor may be built from a missing artifact"),
    }
}

#[test]
fn service_rejects_out_of_range_requests() {
    let predictor = CreditPredictor::from_artifact(fixture_path()).expect("fixture loads");
    let service = ScoringService::new(predictor, "missing-logo.png");

    let request = DashboardRequest {
        input: ApplicationInput {
            requested_amount: 25_000_000.0,
            ..form_values()
        },
        run_prediction: true,
    };

    assert!(matches!(
        service.dashboard(&request),
        Err(PredictionError::InvalidInput(_))
    ));
}
