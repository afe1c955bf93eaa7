use crate::infra::{AppState, ForestScoringService};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use credit_scoring::scoring::scoring_router;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

pub(crate) fn with_scoring_routes(service: Arc<ForestScoringService>) -> axum::Router {
    scoring_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/assets/logo", axum::routing::get(logo_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Serve the dashboard logo. A missing logo is a 404 with the same warning the dashboard shows.
pub(crate) async fn logo_endpoint(Extension(state): Extension<AppState>) -> Response {
    let path = state.logo_path.as_path();
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.essence_str().to_string())],
                bytes,
            )
                .into_response()
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "logo asset unavailable");
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": credit_scoring::scoring::dashboard::LOGO_MISSING_WARNING })),
            )
                .into_response()
        }
    }
}
