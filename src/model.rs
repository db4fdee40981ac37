use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date-keyed observations exactly as delivered upstream (`YYYYMMDD` → value).
///
/// Keys are not validated; the normalizer decides which ones survive.
pub type RawObservationSet = BTreeMap<String, f64>;

/// The single upstream parameter this application tracks: relative humidity
/// at two metres, in percent.
pub const PARAMETER: &str = "RH2M";

/// A fixed point on the globe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// One day's measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// Observations in strictly ascending date order.
///
/// Gaps between dates are left as-is; nothing is interpolated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    observations: Vec<Observation>,
}

impl Series {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.observations.iter().map(|o| o.value)
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }
}

/// Collects observations into date order. When two observations share a
/// date, the one yielded later wins.
impl FromIterator<Observation> for Series {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        let by_date: BTreeMap<NaiveDate, f64> =
            iter.into_iter().map(|o| (o.date, o.value)).collect();
        Self {
            observations: by_date
                .into_iter()
                .map(|(date, value)| Observation { date, value })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForecastMethod {
    MovingAverage,
    LinearTrend,
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MovingAverage => write!(f, "moving-average"),
            Self::LinearTrend => write!(f, "linear-trend"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastResult {
    pub method: ForecastMethod,
    pub value: f64,
}

/// Record handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub moving_average_forecast: f64,
    pub linear_trend_forecast: f64,
    pub observation_count: usize,
}

/// Prediction returned by the optional secondary forecast service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceForecast {
    pub predicted_value: f64,
    pub model_order: Vec<i64>,
    pub fit_quality_score: f64,
}
