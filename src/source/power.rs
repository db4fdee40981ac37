use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::PowerConfig;
use crate::error::FetchError;
use crate::model::{Location, PARAMETER, RawObservationSet};
use crate::source::ClimateSource;

const SOURCE_NAME: &str = "nasa-power";

/// Client for the NASA POWER daily point API.
pub struct PowerClient {
    client: reqwest::Client,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    base_url: String,
    community: String,
    start: String,
    end: String,
}

impl PowerClient {
    pub fn new(config: &PowerConfig) -> Result<Self, Report<FetchError>> {
        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(nonzero!(30u32));
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .change_context(FetchError::Request {
                source_name: SOURCE_NAME.into(),
            })?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
            base_url: config.base_url.clone(),
            community: config.community.clone(),
            start: config.start.clone(),
            end: config.end.clone(),
        })
    }

    fn query_params(&self, location: Location) -> Vec<(&'static str, String)> {
        vec![
            ("parameters", PARAMETER.to_owned()),
            ("community", self.community.clone()),
            ("longitude", location.longitude.to_string()),
            ("latitude", location.latitude.to_string()),
            ("start", self.start.clone()),
            ("end", self.end.clone()),
            ("format", "JSON".to_owned()),
        ]
    }
}

impl ClimateSource for PowerClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn fetch_daily(
        &self,
        location: Location,
    ) -> BoxFuture<'_, Result<RawObservationSet, Report<FetchError>>> {
        Box::pin(async move {
            self.rate_limiter.until_ready().await;

            info!(
                latitude = location.latitude,
                longitude = location.longitude,
                start = %self.start,
                end = %self.end,
                "fetching daily {PARAMETER} observations"
            );

            let response = self
                .client
                .get(&self.base_url)
                .query(&self.query_params(location))
                .send()
                .await
                .change_context(FetchError::Request {
                    source_name: SOURCE_NAME.into(),
                })
                .attach_with(|| format!("url: {}", self.base_url))?;

            let status = response.status();
            if !status.is_success() {
                return Err(Report::new(FetchError::Status {
                    source_name: SOURCE_NAME.into(),
                    status: status.as_u16(),
                }));
            }

            let body = response.bytes().await.change_context(FetchError::Request {
                source_name: SOURCE_NAME.into(),
            })?;

            let raw = decode_response(&body)?;
            debug!(entries = raw.len(), "decoded {PARAMETER} response");
            Ok(raw)
        })
    }
}

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: PowerParameters,
}

#[derive(Debug, Deserialize)]
struct PowerParameters {
    #[serde(rename = "RH2M")]
    rh2m: RawObservationSet,
}

/// Extract `properties.parameter.RH2M` from a POWER response body.
///
/// A missing path or a non-numeric value is a decode failure; it never
/// degrades into an empty set.
pub fn decode_response(body: &[u8]) -> Result<RawObservationSet, Report<FetchError>> {
    let response: PowerResponse =
        serde_json::from_slice(body).change_context(FetchError::Decode {
            source_name: SOURCE_NAME.into(),
        })?;
    Ok(response.properties.parameter.rh2m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::normalize;

    fn decode(json: &str) -> Result<RawObservationSet, Report<FetchError>> {
        decode_response(json.as_bytes())
    }

    #[test]
    fn decodes_nested_parameter_map() {
        let json = r#"{
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [-38.5, -3.7, 12.3]},
            "properties": {"parameter": {"RH2M": {"20241201": 74.12, "20241202": 75.0}}},
            "header": {"title": "NASA/POWER"}
        }"#;
        let raw = decode(json).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw["20241201"], 74.12);
    }

    #[test]
    fn empty_parameter_map_is_valid_empty_dataset() {
        let raw = decode(r#"{"properties": {"parameter": {"RH2M": {}}}}"#).unwrap();
        assert!(raw.is_empty());
        assert!(normalize(&raw).is_empty());
    }

    #[test]
    fn non_numeric_value_is_decode_failure() {
        let json = r#"{"properties": {"parameter": {"RH2M": {
            "20250101": 80.0,
            "20250102": "invalid-not-a-number"
        }}}}"#;
        let err = decode(json).unwrap_err();
        assert!(matches!(err.current_context(), FetchError::Decode { .. }));
    }

    #[test]
    fn missing_path_is_decode_failure() {
        for json in [
            r#"{}"#,
            r#"{"properties": {}}"#,
            r#"{"properties": {"parameter": {"T2M": {"20250101": 25.0}}}}"#,
            r#"{"messages": ["quota exceeded"]}"#,
            "not json at all",
        ] {
            let err = decode(json).unwrap_err();
            assert!(
                matches!(err.current_context(), FetchError::Decode { .. }),
                "expected decode failure for {json}"
            );
        }
    }

    #[test]
    fn unparseable_key_survives_decode_but_not_normalize() {
        let raw =
            decode(r#"{"properties": {"parameter": {"RH2M": {"notadate": 50.0, "20250101": 60.0}}}}"#)
                .unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(normalize(&raw).len(), 1);
    }

    #[test]
    fn query_params_match_power_api() {
        let client = PowerClient::new(&PowerConfig::default()).unwrap();
        let params = client.query_params(Location {
            latitude: -3.7,
            longitude: -38.5,
        });
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("parameters"), Some("RH2M"));
        assert_eq!(get("community"), Some("SB"));
        assert_eq!(get("latitude"), Some("-3.7"));
        assert_eq!(get("longitude"), Some("-38.5"));
        assert_eq!(get("start"), Some("20241201"));
        assert_eq!(get("end"), Some("20250501"));
        assert_eq!(get("format"), Some("JSON"));
    }

    /// Integration test: requires network access. Run with `cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn integration_fetch_daily() {
        let client = PowerClient::new(&PowerConfig::default()).unwrap();
        let raw = client
            .fetch_daily(Location {
                latitude: -3.7,
                longitude: -38.5,
            })
            .await
            .unwrap();
        assert!(!normalize(&raw).is_empty());
    }
}
