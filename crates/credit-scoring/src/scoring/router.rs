use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, warn};

use super::classifier::{CreditClassifier, ModelSummary};
use super::dashboard::format_percentage;
use super::domain::{ApplicationInput, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use super::predictor::{CreditDecision, PredictionError};
use super::service::{DashboardRequest, ScoringService};

/// Shown to users when inference fails; the cause only goes to the logs.
pub const INFERENCE_FAILURE_MESSAGE: &str = "la prédiction a échoué";

/// Router builder exposing the dashboard and prediction endpoints.
pub fn scoring_router<C>(service: Arc<ScoringService<C>>) -> Router
where
    C: CreditClassifier + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/credit/dashboard", post(dashboard_handler::<C>))
        .route("/api/v1/credit/predictions", post(prediction_handler::<C>))
        .route("/api/v1/credit/model", get(model_handler::<C>))
        .with_state(service)
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub label: CreditDecision,
    pub approved: bool,
    pub rejection_probability: f64,
    pub probability_text: String,
    pub cash_flow: f64,
    pub features: FeatureVector,
    pub evaluated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelView {
    pub expected_features: usize,
    pub feature_order: [&'static str; FEATURE_COUNT],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelSummary>,
}

pub(crate) async fn dashboard_handler<C>(
    State(service): State<Arc<ScoringService<C>>>,
    payload: Result<axum::Json<DashboardRequest>, JsonRejection>,
) -> Response
where
    C: CreditClassifier + ?Sized + 'static,
{
    let axum::Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.dashboard(&request) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => prediction_error_response(err),
    }
}

pub(crate) async fn prediction_handler<C>(
    State(service): State<Arc<ScoringService<C>>>,
    payload: Result<axum::Json<ApplicationInput>, JsonRejection>,
) -> Response
where
    C: CreditClassifier + ?Sized + 'static,
{
    let axum::Json(input) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    match service.predict(&input) {
        Ok(assessment) => {
            let result = assessment.result;
            let body = PredictionResponse {
                label: result.label,
                approved: result.approved(),
                rejection_probability: result.rejection_probability,
                probability_text: format_percentage(result.rejection_probability),
                cash_flow: assessment.application.cash_flow(),
                features: assessment.features,
                evaluated_at: Utc::now(),
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(err) => prediction_error_response(err),
    }
}

pub(crate) async fn model_handler<C>(State(service): State<Arc<ScoringService<C>>>) -> Response
where
    C: CreditClassifier + ?Sized + 'static,
{
    let view = ModelView {
        expected_features: service.expected_features(),
        feature_order: FEATURE_NAMES,
        model: service.model_summary(),
    };
    (StatusCode::OK, axum::Json(view)).into_response()
}

/// Unreadable bodies keep axum's status (400, 415 or 422) but answer in the usual JSON shape.
fn rejection_response(rejection: JsonRejection) -> Response {
    let status = rejection.status();
    let message = rejection.body_text();
    debug!(%status, error = %message, "rejected credit request body");
    let payload = json!({
        "error": message,
    });
    (status, axum::Json(payload)).into_response()
}

/// Map a failed interaction to a user-facing message. Never leaks internals for inference faults.
pub fn prediction_error_response(err: PredictionError) -> Response {
    match err {
        PredictionError::InvalidInput(input) => {
            let payload = json!({
                "error": input.to_string(),
                "field": input.field(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        PredictionError::ModelUnavailable(model) => {
            warn!(error = %model, "prediction requested without a usable model");
            let payload = json!({
                "error": "model unavailable",
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        PredictionError::Inference(inference) => {
            error!(error = %inference, "credit prediction failed");
            let payload = json!({
                "error": INFERENCE_FAILURE_MESSAGE,
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
