pub mod arima;

use chrono::NaiveDate;
use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::ServiceError;
use crate::model::{Location, ServiceForecast};

/// What the secondary service is asked to predict.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRequest {
    pub location: Location,
    pub parameter: String,
    pub forecast_date: NaiveDate,
}

/// Remote forecaster reached over request/response.
///
/// Its answer is an independent signal; nothing merges it with the local
/// forecasts.
pub trait ForecastService: Send + Sync {
    fn predict(
        &self,
        request: &ServiceRequest,
    ) -> BoxFuture<'_, Result<ServiceForecast, Report<ServiceError>>>;
}
