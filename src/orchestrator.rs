use std::sync::Arc;

use error_stack::{Report, ResultExt};
use tokio::sync::watch;

use crate::config::ForecastConfig;
use crate::error::ForecastError;
use crate::forecast::Forecaster;
use crate::forecast::linear_trend::{LinearTrend, linear_trend_forecast};
use crate::forecast::moving_average::MovingAverage;
use crate::model::{ForecastResult, ForecastSummary, Series};

/// Owns the current [`Series`] and derives forecasts from it on demand.
///
/// The series sits in a `watch` channel: `replace_series` swaps the whole
/// `Arc` in one step, so readers see either the old or the new series and
/// never a mix.
pub struct ForecastOrchestrator {
    series: watch::Sender<Arc<Series>>,
    moving_average: MovingAverage,
    linear_trend: LinearTrend,
}

impl ForecastOrchestrator {
    pub fn new(moving_average: MovingAverage, linear_trend: LinearTrend) -> Self {
        let (series, _) = watch::channel(Arc::new(Series::empty()));
        Self {
            series,
            moving_average,
            linear_trend,
        }
    }

    pub fn from_config(config: &ForecastConfig) -> Result<Self, Report<ForecastError>> {
        let moving_average = MovingAverage::new(config.window)
            .attach_with(|| format!("forecast.window = {}", config.window))?;
        Ok(Self::new(
            moving_average,
            LinearTrend::new(config.horizon_days),
        ))
    }

    pub fn current_series(&self) -> Arc<Series> {
        Arc::clone(&self.series.borrow())
    }

    pub fn replace_series(&self, series: Series) {
        self.series.send_replace(Arc::new(series));
    }

    /// Receiver that wakes whenever the series is replaced.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Series>> {
        self.series.subscribe()
    }

    /// Both forecasts over the current series.
    ///
    /// An empty series is `InsufficientData`. A single observation is its own
    /// trend forecast.
    pub fn forecasts(&self) -> Result<ForecastSummary, Report<ForecastError>> {
        let series = self.current_series();
        let moving_average = self.moving_average.forecast(&series)?;
        let linear_trend = linear_trend_forecast(&series, self.linear_trend.horizon())?;
        Ok(ForecastSummary {
            moving_average_forecast: moving_average.value,
            linear_trend_forecast: linear_trend,
            observation_count: series.len(),
        })
    }

    /// Each forecaster's outcome on the current series, tagged by method.
    pub fn forecast_results(&self) -> Vec<Result<ForecastResult, Report<ForecastError>>> {
        let series = self.current_series();
        let forecasters: [&dyn Forecaster; 2] = [&self.moving_average, &self.linear_trend];
        forecasters.iter().map(|f| f.forecast(&series)).collect()
    }
}

impl Default for ForecastOrchestrator {
    fn default() -> Self {
        Self::new(MovingAverage::default(), LinearTrend::default())
    }
}
