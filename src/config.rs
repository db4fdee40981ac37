use std::path::Path;

use chrono::NaiveDate;
use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::forecast::linear_trend::DEFAULT_HORIZON;
use crate::forecast::moving_average::DEFAULT_WINDOW;
use crate::model::Location;
use crate::series::parse_date_key;

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_latitude() -> f64 {
    -3.7
}

fn default_longitude() -> f64 {
    -38.5
}

fn default_power_base_url() -> String {
    "https://power.larc.nasa.gov/api/temporal/daily/point".into()
}

fn default_community() -> String {
    "SB".into()
}

fn default_start() -> String {
    "20241201".into()
}

fn default_end() -> String {
    "20250501".into()
}

fn default_requests_per_minute() -> u32 {
    30
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_horizon_days() -> usize {
    DEFAULT_HORIZON
}

fn default_service_url() -> String {
    "http://localhost:8000/forecast".into()
}

fn default_forecast_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 10).unwrap_or_default()
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub power: PowerConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
}

impl LocationConfig {
    pub fn location(&self) -> Location {
        Location {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
        }
    }
}

/// NASA POWER daily point endpoint settings.
#[derive(Debug, Deserialize)]
pub struct PowerConfig {
    #[serde(default = "default_power_base_url")]
    pub base_url: String,
    #[serde(default = "default_community")]
    pub community: String,
    /// First day requested, `YYYYMMDD`.
    #[serde(default = "default_start")]
    pub start: String,
    /// Last day requested, `YYYYMMDD`.
    #[serde(default = "default_end")]
    pub end: String,
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            base_url: default_power_base_url(),
            community: default_community(),
            start: default_start(),
            end: default_end(),
            requests_per_minute: default_requests_per_minute(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ForecastConfig {
    /// Trailing observations averaged by the moving-average forecast.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Steps past the last observation at which the trend line is evaluated.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            horizon_days: default_horizon_days(),
        }
    }
}

/// Optional secondary forecast service.
#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_service_url")]
    pub url: String,
    /// Target date, `YYYY-MM-DD`.
    #[serde(default = "default_forecast_date")]
    pub forecast_date: NaiveDate,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_service_url(),
            forecast_date: default_forecast_date(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

const VALID_LOG_FORMATS: &[&str] = &["text", "json"];

fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_log_format(config)?;
    validate_location(config)?;
    validate_power(config)?;
    validate_forecast(config)?;
    Ok(())
}

fn invalid(field: String) -> Report<ConfigError> {
    Report::new(ConfigError::Validation { field })
}

fn validate_log_format(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let format = config.general.log_format.as_str();
    if !VALID_LOG_FORMATS.contains(&format) {
        return Err(invalid(format!(
            "general.log_format \"{format}\" is not one of {VALID_LOG_FORMATS:?}"
        )));
    }
    Ok(())
}

fn validate_location(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let LocationConfig {
        latitude,
        longitude,
    } = config.location;
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(invalid(format!(
            "location.latitude {latitude} is outside -90..=90"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(invalid(format!(
            "location.longitude {longitude} is outside -180..=180"
        )));
    }
    Ok(())
}

fn validate_power(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    let power = &config.power;
    let start = parse_date_key(&power.start)
        .ok_or_else(|| invalid(format!("power.start \"{}\" is not YYYYMMDD", power.start)))?;
    let end = parse_date_key(&power.end)
        .ok_or_else(|| invalid(format!("power.end \"{}\" is not YYYYMMDD", power.end)))?;
    if start > end {
        return Err(invalid(format!(
            "power.start {} is after power.end {}",
            power.start, power.end
        )));
    }
    if power.requests_per_minute == 0 {
        return Err(invalid("power.requests_per_minute must be > 0".into()));
    }
    Ok(())
}

fn validate_forecast(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if config.forecast.window == 0 {
        return Err(invalid("forecast.window must be > 0".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> AppConfig {
        toml::from_str(toml).expect("parse failed")
    }

    #[test]
    fn valid_full_config_parses() {
        let toml = r#"
[general]
log_level = "debug"
log_format = "json"

[location]
latitude = -23.5
longitude = -46.6

[power]
base_url = "https://power.example.test/daily"
community = "AG"
start = "20240101"
end = "20241231"
requests_per_minute = 10
timeout_secs = 5

[forecast]
window = 14
horizon_days = 30

[service]
enabled = true
url = "http://127.0.0.1:9000/forecast"
forecast_date = "2025-05-01"
"#;
        let config = parse(toml);
        assert!(validate(&config).is_ok());
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.location.location().latitude, -23.5);
        assert_eq!(config.power.community, "AG");
        assert_eq!(config.forecast.window, 14);
        assert_eq!(config.forecast.horizon_days, 30);
        assert!(config.service.enabled);
        assert_eq!(
            config.service.forecast_date,
            NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
        );
    }

    #[test]
    fn defaults_applied_when_empty() {
        let config = parse("");
        assert!(validate(&config).is_ok());
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "text");
        assert_eq!(config.location.latitude, -3.7);
        assert_eq!(config.location.longitude, -38.5);
        assert_eq!(config.power.start, "20241201");
        assert_eq!(config.power.end, "20250501");
        assert_eq!(config.power.community, "SB");
        assert_eq!(config.forecast.window, 30);
        assert_eq!(config.forecast.horizon_days, 180);
        assert!(!config.service.enabled);
        assert_eq!(config.service.url, "http://localhost:8000/forecast");
    }

    #[test]
    fn unknown_log_format_rejected() {
        let config = parse("[general]\nlog_format = \"xml\"\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn out_of_range_latitude_rejected() {
        let config = parse("[location]\nlatitude = 91.0\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn out_of_range_longitude_rejected() {
        let config = parse("[location]\nlongitude = -180.5\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn malformed_power_date_rejected() {
        let config = parse("[power]\nstart = \"2024-12-01\"\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn inverted_power_range_rejected() {
        let config = parse("[power]\nstart = \"20250601\"\nend = \"20250501\"\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_rate_limit_rejected() {
        let config = parse("[power]\nrequests_per_minute = 0\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_window_rejected() {
        let config = parse("[forecast]\nwindow = 0\n");
        assert!(validate(&config).is_err());
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let err = load(Path::new("/nonexistent/humidity-forecast.toml")).unwrap_err();
        assert!(matches!(err.current_context(), ConfigError::ReadFile));
    }
}
