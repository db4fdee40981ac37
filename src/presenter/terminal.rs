use crate::model::{ForecastSummary, Observation, PARAMETER, Series, ServiceForecast};
use crate::presenter::{FetchStatus, Presenter};

/// Writes the series and forecasts to stdout, status updates to the log.
pub struct TerminalPresenter;

fn format_observation(observation: &Observation) -> String {
    format!(
        "{}: {:.2} %",
        observation.date.format("%b %-d, %Y"),
        observation.value
    )
}

fn format_summary(summary: &ForecastSummary) -> [String; 2] {
    [
        format!(
            "Mean RH forecast for next month: {:.2} %",
            summary.moving_average_forecast
        ),
        format!(
            "Linear-regression RH forecast for next month: {:.2} %",
            summary.linear_trend_forecast
        ),
    ]
}

impl Presenter for TerminalPresenter {
    fn status(&self, status: &FetchStatus) {
        match status {
            FetchStatus::DecodeFailed | FetchStatus::RequestFailed { .. } => {
                tracing::warn!("{status}");
            }
            _ => tracing::info!("{status}"),
        }
    }

    fn series(&self, series: &Series) {
        println!("NASA POWER Daily Humidity ({PARAMETER})");
        for observation in series.observations() {
            println!("{}", format_observation(observation));
        }
    }

    fn forecasts(&self, summary: &ForecastSummary) {
        for line in format_summary(summary) {
            println!("{line}");
        }
    }

    fn service_forecast(&self, forecast: &ServiceForecast) {
        tracing::info!(
            predicted_value = forecast.predicted_value,
            model_order = ?forecast.model_order,
            fit_quality_score = forecast.fit_quality_score,
            "secondary service forecast"
        );
    }
}
