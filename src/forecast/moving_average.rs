use error_stack::{Report, bail};

use crate::error::ForecastError;
use crate::forecast::{Forecaster, ensure_enough};
use crate::model::{ForecastMethod, ForecastResult, Series};

pub const DEFAULT_WINDOW: usize = 30;

/// Mean of the trailing `window` values (all values if the series is shorter).
///
/// Returns `0.0` for an empty series. That sentinel is indistinguishable from a
/// genuine zero average, so check `series.is_empty()` before trusting it.
pub fn moving_average_forecast(series: &Series, window: usize) -> f64 {
    let w = window.min(series.len());
    if w == 0 {
        return 0.0;
    }
    let tail = &series.observations()[series.len() - w..];
    // Summing offsets from the first value keeps a constant window exact.
    let pivot = tail[0].value;
    pivot + tail.iter().map(|o| o.value - pivot).sum::<f64>() / w as f64
}

/// Trailing-window moving average.
pub struct MovingAverage {
    window: usize,
}

impl MovingAverage {
    pub fn new(window: usize) -> Result<Self, Report<ForecastError>> {
        if window == 0 {
            bail!(ForecastError::InvalidParameter {
                name: "window must be > 0".into(),
            });
        }
        Ok(Self { window })
    }
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
        }
    }
}

impl Forecaster for MovingAverage {
    fn method(&self) -> ForecastMethod {
        ForecastMethod::MovingAverage
    }

    fn required_observations(&self) -> usize {
        1
    }

    fn forecast(&self, series: &Series) -> Result<ForecastResult, Report<ForecastError>> {
        ensure_enough(self, series)?;
        Ok(ForecastResult {
            method: self.method(),
            value: moving_average_forecast(series, self.window),
        })
    }
}
