use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::classifier::{CreditClassifier, ModelSummary};
use super::dashboard::{Branding, DashboardView, PredictionState};
use super::domain::{ApplicationInput, CreditApplication};
use super::predictor::{Assessment, CreditPredictor, PredictionError};

/// Dashboard payload: the current form values plus whether the run action was triggered.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DashboardRequest {
    #[serde(flatten)]
    pub input: ApplicationInput,
    #[serde(default)]
    pub run_prediction: bool,
}

/// Service composing the predictor facade with the dashboard assets.
pub struct ScoringService<C: ?Sized> {
    predictor: CreditPredictor<C>,
    logo_path: PathBuf,
}

impl<C> ScoringService<C>
where
    C: CreditClassifier + ?Sized,
{
    pub fn new(predictor: CreditPredictor<C>, logo_path: impl Into<PathBuf>) -> Self {
        Self {
            predictor,
            logo_path: logo_path.into(),
        }
    }

    pub fn predictor(&self) -> &CreditPredictor<C> {
        &self.predictor
    }

    pub fn logo_path(&self) -> &Path {
        &self.logo_path
    }

    /// Resolved on every render so a logo dropped in after startup is picked up.
    pub fn branding(&self) -> Branding {
        Branding {
            logo_available: self.logo_path.is_file(),
        }
    }

    /// One render cycle: rebuild the application, optionally run the prediction, build the view.
    pub fn dashboard(&self, request: &DashboardRequest) -> Result<DashboardView, PredictionError> {
        let application = CreditApplication::from_input(&request.input)?;
        let mut state = PredictionState::Idle;
        if request.run_prediction {
            state.run_prediction(&self.predictor, &application)?;
        }
        Ok(DashboardView::render(&application, &state, self.branding()))
    }

    pub fn predict(&self, input: &ApplicationInput) -> Result<Assessment, PredictionError> {
        self.predictor.assess(input)
    }

    pub fn model_summary(&self) -> Option<ModelSummary> {
        self.predictor.classifier().summary()
    }

    pub fn expected_features(&self) -> usize {
        self.predictor.classifier().expected_features()
    }
}
