pub mod terminal;

use std::fmt;

use crate::model::{ForecastSummary, Series, ServiceForecast};

/// Progress of the most recent fetch, as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    Loading,
    Loaded { count: usize },
    /// The response was well-formed but carried no usable observations.
    NoData,
    DecodeFailed,
    RequestFailed { reason: String },
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading data..."),
            Self::Loaded { count } => write!(f, "Data loaded: {count} records"),
            Self::NoData => write!(f, "No data available"),
            Self::DecodeFailed => write!(f, "Could not decode data"),
            Self::RequestFailed { reason } => write!(f, "Error: {reason}"),
        }
    }
}

/// Sink for everything the user sees.
pub trait Presenter: Send + Sync {
    fn status(&self, status: &FetchStatus);

    fn series(&self, series: &Series);

    fn forecasts(&self, summary: &ForecastSummary);

    fn service_forecast(&self, forecast: &ServiceForecast);
}
