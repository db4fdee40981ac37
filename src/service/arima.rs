use std::time::Duration;

use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::model::ServiceForecast;
use crate::service::{ForecastService, ServiceRequest};

/// HTTP client for the ARIMA forecast endpoint.
pub struct ArimaService {
    client: reqwest::Client,
    url: String,
}

impl ArimaService {
    pub fn new(config: &ServiceConfig) -> Result<Self, Report<ServiceError>> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .change_context(ServiceError::Request)?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
struct ArimaRequestBody<'a> {
    lat: f64,
    lon: f64,
    parameter: &'a str,
    forecast_date: String,
}

impl<'a> ArimaRequestBody<'a> {
    fn from_request(request: &'a ServiceRequest) -> Self {
        Self {
            lat: request.location.latitude,
            lon: request.location.longitude,
            parameter: &request.parameter,
            forecast_date: request.forecast_date.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArimaResponseBody {
    predicted_value: f64,
    arima_order: Vec<i64>,
    aic: f64,
}

impl From<ArimaResponseBody> for ServiceForecast {
    fn from(body: ArimaResponseBody) -> Self {
        Self {
            predicted_value: body.predicted_value,
            model_order: body.arima_order,
            fit_quality_score: body.aic,
        }
    }
}

impl ForecastService for ArimaService {
    fn predict(
        &self,
        request: &ServiceRequest,
    ) -> BoxFuture<'_, Result<ServiceForecast, Report<ServiceError>>> {
        let body = serde_json::to_value(ArimaRequestBody::from_request(request));
        Box::pin(async move {
            let body = body.change_context(ServiceError::Request)?;
            info!(url = %self.url, "requesting ARIMA forecast");

            let response = self
                .client
                .post(&self.url)
                .json(&body)
                .send()
                .await
                .change_context(ServiceError::Request)
                .attach_with(|| format!("url: {}", self.url))?;

            let status = response.status();
            if !status.is_success() {
                return Err(Report::new(ServiceError::Status {
                    status: status.as_u16(),
                }));
            }

            let parsed: ArimaResponseBody = response
                .json()
                .await
                .change_context(ServiceError::ResponseParse)?;
            Ok(parsed.into())
        })
    }
}
