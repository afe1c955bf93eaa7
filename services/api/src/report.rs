//! Terminal rendition of the credit dashboard.

use chrono::Utc;
use clap::Args;
use credit_scoring::config::AppConfig;
use credit_scoring::error::AppError;
use credit_scoring::scoring::dashboard::{group_thousands, ChartView, PanelStatus};
use credit_scoring::scoring::{
    ApplicationInput, CreditPredictor, DashboardRequest, DashboardView, ScoringService,
};
use credit_scoring::telemetry;
use std::fmt;
use std::path::PathBuf;
use tracing::error;

const BAR_WIDTH: usize = 40;

#[derive(Args, Debug)]
pub(crate) struct DashboardArgs {
    /// Applicant age in years (18-70)
    #[arg(long, default_value_t = 35)]
    pub(crate) age: i64,
    /// Monthly income in FCFA
    #[arg(long, default_value_t = 300_000.0)]
    pub(crate) income: f64,
    /// Monthly expenses in FCFA
    #[arg(long, default_value_t = 100_000.0)]
    pub(crate) expenses: f64,
    /// Loan duration in months (6-36)
    #[arg(long, default_value_t = 12)]
    pub(crate) term: i64,
    /// Requested amount in FCFA
    #[arg(long, default_value_t = 2_000_000.0)]
    pub(crate) amount: f64,
    /// Guarantee type: aucune, personnelle or réelle
    #[arg(long, default_value = "aucune")]
    pub(crate) guarantee: String,
    /// Run the classifier and show the verdict
    #[arg(long)]
    pub(crate) run_prediction: bool,
    /// Forest artifact to load instead of APP_MODEL_PATH
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

impl DashboardArgs {
    pub(crate) fn input(&self) -> ApplicationInput {
        ApplicationInput {
            age: self.age,
            monthly_income: self.income,
            monthly_expenses: self.expenses,
            term_months: self.term,
            requested_amount: self.amount,
            guarantee: self.guarantee.clone(),
        }
    }
}

pub(crate) fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(model) = args.model.clone() {
        config.model.artifact_path = model;
    }

    telemetry::init(&config.telemetry)?;

    let path = &config.model.artifact_path;
    let predictor = CreditPredictor::from_artifact(path).map_err(|err| {
        error!(path = %path.display(), error = %err, "credit model unavailable");
        err
    })?;
    let service = ScoringService::new(predictor, config.assets.logo_path.clone());

    let request = DashboardRequest {
        input: args.input(),
        run_prediction: args.run_prediction,
    };
    let view = service.dashboard(&request)?;

    print!("{}", render_dashboard(&view));
    println!("Généré le {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    Ok(())
}

/// Plain-text layout of a dashboard view: header, metrics, chart, then the prediction panel.
pub(crate) fn render_dashboard(view: &DashboardView) -> String {
    DashboardText(view).to_string()
}

struct DashboardText<'a>(&'a DashboardView);

impl fmt::Display for DashboardText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;

        writeln!(f, "{}", view.header.title)?;
        writeln!(f, "{}", "=".repeat(view.header.title.chars().count()))?;
        if let Some(warning) = view.header.logo_warning {
            writeln!(f, "! {warning}")?;
        }
        writeln!(f)?;

        writeln!(f, "{}", view.cash_flow_summary)?;
        writeln!(f)?;

        for metric in &view.metrics {
            writeln!(f, "  {metric}")?;
        }
        writeln!(f)?;

        write!(
            f,
            "{}",
            ChartText {
                chart: &view.chart,
                width: BAR_WIDTH,
            }
        )?;
        writeln!(f)?;

        let marker = match view.prediction.status {
            PanelStatus::Idle => "[ ]",
            PanelStatus::Success => "[OK]",
            PanelStatus::Error => "[X]",
        };
        writeln!(f, "{marker} {}", view.prediction.message)?;
        if let Some(text) = &view.prediction.probability_text {
            writeln!(f, "    {text}")?;
        }
        Ok(())
    }
}

/// Horizontal bars scaled to the largest positive value.
struct ChartText<'a> {
    chart: &'a ChartView,
    width: usize,
}

impl fmt::Display for ChartText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ChartText { chart, width } = *self;
        writeln!(f, "{} ({})", chart.title, chart.y_label)?;

        let label_width = chart
            .bars
            .iter()
            .map(|bar| bar.label.chars().count())
            .max()
            .unwrap_or(0);
        let max = chart
            .bars
            .iter()
            .map(|bar| bar.value)
            .filter(|value| value.is_finite())
            .fold(0.0_f64, f64::max);

        for bar in &chart.bars {
            let filled = if max > 0.0 && bar.value > 0.0 {
                (((bar.value / max) * width as f64).round() as usize).min(width)
            } else {
                0
            };
            let padding = label_width - bar.label.chars().count();
            writeln!(
                f,
                "  {}{} |{}{}| {}",
                bar.label,
                " ".repeat(padding),
                "#".repeat(filled),
                " ".repeat(width - filled),
                group_thousands(bar.value)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_scoring::scoring::dashboard::ChartBar;
    use credit_scoring::scoring::{
        Branding, CreditApplication, CreditDecision, PredictionResult, PredictionState,
    };

    fn application() -> CreditApplication {
        CreditApplication::from_input(&ApplicationInput::default()).expect("default input is valid")
    }

    #[test]
    fn idle_dashboard_prompts_for_a_run() {
        let view = DashboardView::render(
            &application(),
            &PredictionState::Idle,
            Branding {
                logo_available: false,
            },
        );
        let text = render_dashboard(&view);

        assert!(text.starts_with("Tableau de bord de prédiction de crédit\n"));
        assert!(text.contains("! Logo non trouvé."));
        assert!(text.contains("Cashflow (70%) = 140,000 FCFA"));
        assert!(text.contains("  Revenu net: 200,000 FCFA"));
        assert!(text.contains("[ ] Cliquez sur le bouton pour lancer la prédiction."));
        assert!(!text.contains("Probabilité de refus"));
    }

    #[test]
    fn rejected_dashboard_shows_probability() {
        let state = PredictionState::ResultAvailable(PredictionResult {
            label: CreditDecision::Rejected,
            rejection_probability: 0.8,
        });
        let view = DashboardView::render(
            &application(),
            &state,
            Branding {
                logo_available: true,
            },
        );
        let text = render_dashboard(&view);

        assert!(!text.contains("Logo non trouvé."));
        assert!(text.contains("[X] Crédit non validé"));
        assert!(text.contains("Probabilité de refus : 80.00%"));
    }

    #[test]
    fn chart_scales_to_the_largest_bar() {
        let chart = ChartView {
            title: "Comparaison",
            y_label: "FCFA",
            bars: vec![
                ChartBar {
                    label: "Cashflow",
                    value: 1_000_000.0,
                    color: "green",
                },
                ChartBar {
                    label: "Montant",
                    value: 2_000_000.0,
                    color: "red",
                },
            ],
        };
        let text = ChartText {
            chart: &chart,
            width: 10,
        }
        .to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Comparaison (FCFA)");
        assert_eq!(lines[1], "  Cashflow |#####     | 1,000,000");
        assert_eq!(lines[2], "  Montant  |##########| 2,000,000");
    }

    #[test]
    fn negative_bar_is_left_empty() {
        let chart = ChartView {
            title: "Comparaison",
            y_label: "FCFA",
            bars: vec![ChartBar {
                label: "Cashflow",
                value: -840_000.0,
                color: "green",
            }],
        };
        let text = ChartText {
            chart: &chart,
            width: 4,
        }
        .to_string();

        assert!(text.contains("  Cashflow |    | -840,000"));
    }
}
