use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

#[derive(Debug, Display, Error)]
pub enum FetchError {
    #[display("request to {source_name} failed")]
    Request { source_name: String },
    #[display("{source_name} responded with HTTP {status}")]
    Status { source_name: String, status: u16 },
    /// The response body did not have the expected shape. Distinct from a
    /// well-formed response that simply carries no observations.
    #[display("failed to decode response from {source_name}")]
    Decode { source_name: String },
}

#[derive(Debug, Display, Error, PartialEq)]
pub enum ForecastError {
    #[display("insufficient data: need {required}, got {available}")]
    InsufficientData { required: usize, available: usize },
    #[display("degenerate least-squares fit over {observations} observations")]
    DegenerateFit { observations: usize },
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
}

#[derive(Debug, Display, Error)]
pub enum ServiceError {
    #[display("request to forecast service failed")]
    Request,
    #[display("forecast service responded with HTTP {status}")]
    Status { status: u16 },
    #[display("failed to parse forecast service response")]
    ResponseParse,
}
