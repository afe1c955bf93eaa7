use credit_scoring::config::AppConfig;
use credit_scoring::error::AppError;
use credit_scoring::scoring::{CreditPredictor, RandomForestClassifier, ScoringService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{error, info, warn};

pub(crate) type ForestScoringService = ScoringService<RandomForestClassifier>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) logo_path: Arc<PathBuf>,
}

/// Load the forest once at startup. Failure here is fatal to the process.
pub(crate) fn load_scoring_service(config: &AppConfig) -> Result<ForestScoringService, AppError> {
    let path = &config.model.artifact_path;
    let predictor = CreditPredictor::from_artifact(path).map_err(|err| {
        error!(
            path = %path.display(),
            error = %err,
            "credit model unavailable; refusing to serve predictions"
        );
        err
    })?;

    let service = ScoringService::new(predictor, config.assets.logo_path.clone());
    if let Some(summary) = service.model_summary() {
        info!(
            path = %path.display(),
            trees = summary.trees,
            n_features = summary.n_features,
            "credit model loaded"
        );
    }
    if !config.assets.logo_available() {
        warn!(
            path = %config.assets.logo_path.display(),
            "logo not found; dashboard will show a warning"
        );
    }

    Ok(service)
}
