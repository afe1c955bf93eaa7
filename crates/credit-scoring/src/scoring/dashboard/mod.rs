//! View model for the credit dashboard.
//!
//! The dashboard is rebuilt from scratch for every interaction: current inputs, the derived cash
//! flow, and a [`PredictionState`] that only leaves `Idle` when a prediction is explicitly run.

pub mod format;
pub mod views;

pub use format::{format_fcfa, format_percentage, group_thousands, CURRENCY};
pub use views::{
    ChartBar, ChartView, DashboardView, HeaderView, MetricView, PanelStatus, PredictionPanel,
};

use serde::Serialize;
use tracing::info;

use super::classifier::CreditClassifier;
use super::domain::CreditApplication;
use super::predictor::{CreditPredictor, PredictionError, PredictionResult};

pub const DASHBOARD_TITLE: &str = "Tableau de bord de prédiction de crédit";
pub const LOGO_MISSING_WARNING: &str = "Logo non trouvé.";
pub const IDLE_MESSAGE: &str = "Cliquez sur le bouton pour lancer la prédiction.";
pub const CHART_TITLE: &str = "Comparaison cashflow vs montant demandé";
pub const CHART_Y_LABEL: &str = "Montant total (FCFA)";

/// Prediction panel state. `run_prediction` is the only transition out of `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "state", content = "result", rename_all = "snake_case")]
pub enum PredictionState {
    #[default]
    Idle,
    ResultAvailable(PredictionResult),
}

impl PredictionState {
    /// Run the classifier for the current application.
    ///
    /// A failure leaves the state `Idle`; the caller reports the error and no partial result is
    /// kept.
    pub fn run_prediction<C>(
        &mut self,
        predictor: &CreditPredictor<C>,
        application: &CreditApplication,
    ) -> Result<PredictionResult, PredictionError>
    where
        C: CreditClassifier + ?Sized,
    {
        *self = PredictionState::Idle;
        let result = predictor.predict(&application.feature_vector())?;
        info!(
            decision = result.label.label(),
            rejection_probability = result.rejection_probability,
            "dashboard prediction run"
        );
        *self = PredictionState::ResultAvailable(result);
        Ok(result)
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            PredictionState::Idle => None,
            PredictionState::ResultAvailable(result) => Some(result),
        }
    }
}

/// Header assets resolved by the caller from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Branding {
    pub logo_available: bool,
}
