use std::fmt;

use serde::Serialize;

use super::format::{format_fcfa, format_percentage};
use super::{
    Branding, PredictionState, CHART_TITLE, CHART_Y_LABEL, DASHBOARD_TITLE, IDLE_MESSAGE,
    LOGO_MISSING_WARNING,
};
use crate::scoring::domain::CreditApplication;
use crate::scoring::predictor::CreditDecision;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderView {
    pub title: &'static str,
    pub logo_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_warning: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricView {
    pub label: &'static str,
    pub value: String,
}

impl fmt::Display for MetricView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: &'static str,
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub title: &'static str,
    pub y_label: &'static str,
    pub bars: Vec<ChartBar>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelStatus {
    Idle,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionPanel {
    pub status: PanelStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability_text: Option<String>,
}

impl PredictionPanel {
    fn from_state(state: &PredictionState) -> Self {
        match state.result() {
            None => Self {
                status: PanelStatus::Idle,
                message: IDLE_MESSAGE.to_string(),
                rejection_probability: None,
                probability_text: None,
            },
            Some(result) => Self {
                status: match result.label {
                    CreditDecision::Approved => PanelStatus::Success,
                    CreditDecision::Rejected => PanelStatus::Error,
                },
                message: result.label.headline().to_string(),
                rejection_probability: Some(result.rejection_probability),
                probability_text: Some(format!(
                    "Probabilité de refus : {}",
                    format_percentage(result.rejection_probability)
                )),
            },
        }
    }
}

/// Everything the presentation layer needs for one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub header: HeaderView,
    pub cash_flow_summary: String,
    pub metrics: Vec<MetricView>,
    pub chart: ChartView,
    pub prediction: PredictionPanel,
}

impl DashboardView {
    pub fn render(
        application: &CreditApplication,
        state: &PredictionState,
        branding: Branding,
    ) -> Self {
        let header = HeaderView {
            title: DASHBOARD_TITLE,
            logo_available: branding.logo_available,
            logo_warning: (!branding.logo_available).then_some(LOGO_MISSING_WARNING),
        };

        let metrics = vec![
            MetricView {
                label: "Âge",
                value: format!("{} ans", application.age()),
            },
            MetricView {
                label: "Revenu net",
                value: format_fcfa(application.net_income()),
            },
            MetricView {
                label: "Durée",
                value: format!("{} mois", application.term_months()),
            },
            MetricView {
                label: "Montant demandé",
                value: format_fcfa(application.requested_amount()),
            },
            MetricView {
                label: "Garantie",
                value: application.guarantee().label().to_string(),
            },
        ];

        let chart = ChartView {
            title: CHART_TITLE,
            y_label: CHART_Y_LABEL,
            bars: vec![
                ChartBar {
                    label: "Cashflow sur durée",
                    value: application.cash_flow_over_term(),
                    color: "green",
                },
                ChartBar {
                    label: "Montant demandé",
                    value: application.requested_amount(),
                    color: "red",
                },
            ],
        };

        Self {
            header,
            cash_flow_summary: format!(
                "Cashflow (70%) = {}",
                format_fcfa(application.cash_flow())
            ),
            metrics,
            chart,
            prediction: PredictionPanel::from_state(state),
        }
    }

    pub fn metric(&self, label: &str) -> Option<&MetricView> {
        self.metrics.iter().find(|metric| metric.label == label)
    }
}
