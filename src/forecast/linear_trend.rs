use error_stack::{Report, bail};

use crate::error::ForecastError;
use crate::forecast::{Forecaster, ensure_enough};
use crate::model::{ForecastMethod, ForecastResult, Series};

/// Indices past the last observation at which the fitted line is evaluated.
/// At daily granularity this is roughly six months ahead.
pub const DEFAULT_HORIZON: usize = 180;

/// Ordinary least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub slope: f64,
    pub intercept: f64,
}

impl Line {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a line through `(xs[i], ys[i])` using the closed-form normal equations.
///
/// Fails with `DegenerateFit` when `n·Σx² − (Σx)²` is zero or not finite.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Result<Line, Report<ForecastError>> {
    let n = xs.len().min(ys.len());
    if n == 0 {
        bail!(ForecastError::InsufficientData {
            required: 2,
            available: 0,
        });
    }

    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let nf = n as f64;
    let denominator = nf * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 || !denominator.is_finite() {
        bail!(ForecastError::DegenerateFit { observations: n });
    }

    let slope = (nf * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / nf;
    Ok(Line { slope, intercept })
}

/// Fit a line over the whole series (x = position, y = value) and evaluate it
/// at `len + horizon`.
///
/// A single observation is returned as-is and an empty series yields `0.0`,
/// the same "no prediction" sentinel as the moving average. No seasonality or
/// outlier handling is attempted.
pub fn linear_trend_forecast(series: &Series, horizon: usize) -> Result<f64, Report<ForecastError>> {
    let n = series.len();
    if n <= 1 {
        return Ok(series.last().map_or(0.0, |o| o.value));
    }

    let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let ys: Vec<f64> = series.values().collect();
    let line = fit_line(&xs, &ys)?;
    Ok(line.at((n + horizon) as f64))
}

/// Least-squares trend extrapolated `horizon` steps past the series end.
pub struct LinearTrend {
    horizon: usize,
}

impl LinearTrend {
    pub fn new(horizon: usize) -> Self {
        Self { horizon }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }
}

impl Default for LinearTrend {
    fn default() -> Self {
        Self::new(DEFAULT_HORIZON)
    }
}

impl Forecaster for LinearTrend {
    fn method(&self) -> ForecastMethod {
        ForecastMethod::LinearTrend
    }

    fn required_observations(&self) -> usize {
        2
    }

    fn forecast(&self, series: &Series) -> Result<ForecastResult, Report<ForecastError>> {
        ensure_enough(self, series)?;
        Ok(ForecastResult {
            method: self.method(),
            value: linear_trend_forecast(series, self.horizon)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Observation;
    use chrono::{Days, NaiveDate};

    fn series_from_values(values: &[f64]) -> Series {
        let start = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| Observation {
                date: start + Days::new(i as u64),
                value,
            })
            .collect()
    }

    fn assert_relative_eq(actual: f64, expected: f64) {
        let scale = expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= 1e-9 * scale,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn empty_series_returns_zero_sentinel() {
        assert_eq!(linear_trend_forecast(&Series::empty(), DEFAULT_HORIZON).unwrap(), 0.0);
    }

    #[test]
    fn single_point_returns_its_value() {
        let series = series_from_values(&[64.2]);
        assert_eq!(linear_trend_forecast(&series, DEFAULT_HORIZON).unwrap(), 64.2);
    }

    #[test]
    fn exact_line_is_extrapolated() {
        for (m, c, n) in [(2.0, 5.0, 2), (-0.25, 80.0, 10), (0.0, 71.5, 30), (0.013, 60.0, 152)] {
            let values: Vec<f64> = (0..n).map(|i| m * i as f64 + c).collect();
            let series = series_from_values(&values);
            let got = linear_trend_forecast(&series, DEFAULT_HORIZON).unwrap();
            assert_relative_eq(got, m * (n + 180) as f64 + c);
        }
    }

    #[test]
    fn horizon_is_configurable() {
        let series = series_from_values(&[1.0, 2.0, 3.0]);
        // slope 1, intercept 1: evaluated at x = 3 + 7
        assert_relative_eq(linear_trend_forecast(&series, 7).unwrap(), 11.0);
        assert_relative_eq(linear_trend_forecast(&series, 0).unwrap(), 4.0);
    }

    #[test]
    fn fit_line_known_values() {
        let line = fit_line(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 2.0, 4.0]).unwrap();
        // Σx=6 Σy=10 Σxy=19 Σx²=14, n=4: slope=(76-60)/(56-36)=0.8, intercept=(10-4.8)/4=1.3
        assert_relative_eq(line.slope, 0.8);
        assert_relative_eq(line.intercept, 1.3);
    }

    #[test]
    fn identical_x_is_degenerate() {
        let err = fit_line(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            *err.current_context(),
            ForecastError::DegenerateFit { observations: 3 }
        );
    }

    #[test]
    fn non_finite_denominator_is_degenerate() {
        let err = fit_line(&[f64::MAX, 0.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err.current_context(),
            ForecastError::DegenerateFit { .. }
        ));
    }

    #[test]
    fn single_point_is_insufficient_through_trait() {
        let err = LinearTrend::default()
            .forecast(&series_from_values(&[50.0]))
            .unwrap_err();
        assert_eq!(
            *err.current_context(),
            ForecastError::InsufficientData {
                required: 2,
                available: 1
            }
        );
    }

    #[test]
    fn trait_reports_method() {
        let result = LinearTrend::new(0)
            .forecast(&series_from_values(&[1.0, 2.0]))
            .unwrap();
        assert_eq!(result.method, ForecastMethod::LinearTrend);
        assert_relative_eq(result.value, 3.0);
    }
}
