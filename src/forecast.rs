pub mod linear_trend;
pub mod moving_average;

use error_stack::{Report, bail};

use crate::error::ForecastError;
use crate::model::{ForecastMethod, ForecastResult, Series};

/// A next-period estimator over an ascending [`Series`].
///
/// Implementations are pure: the same series always yields the same result.
pub trait Forecaster: Send + Sync {
    fn method(&self) -> ForecastMethod;

    /// Minimum number of observations for a meaningful estimate.
    fn required_observations(&self) -> usize;

    /// Produce an estimate, or `InsufficientData` when the series is shorter
    /// than [`Forecaster::required_observations`].
    fn forecast(&self, series: &Series) -> Result<ForecastResult, Report<ForecastError>>;
}

fn ensure_enough(forecaster: &dyn Forecaster, series: &Series) -> Result<(), Report<ForecastError>> {
    let required = forecaster.required_observations();
    if series.len() < required {
        bail!(ForecastError::InsufficientData {
            required,
            available: series.len(),
        });
    }
    Ok(())
}
