mod config;
mod error;
mod forecast;
mod model;
mod orchestrator;
mod presenter;
mod series;
mod service;
mod source;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use error::{FetchError, ForecastError};
use model::{Location, PARAMETER, Series};
use orchestrator::ForecastOrchestrator;
use presenter::terminal::TerminalPresenter;
use presenter::{FetchStatus, Presenter};
use service::arima::ArimaService;
use service::{ForecastService, ServiceRequest};
use source::ClimateSource;
use source::power::PowerClient;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("climate source error")]
    Source,
    #[display("forecast service error")]
    Service,
    #[display("runtime error")]
    Runtime,
}

#[derive(Parser)]
#[command(
    name = "humidity-forecast",
    about = "Daily humidity observations with moving-average and linear-trend forecasts"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config = config::load(Path::new(&cli.config)).change_context(AppError::Config)?;

    init_tracing(&config);

    let location = config.location.location();
    let source: Arc<dyn ClimateSource> =
        Arc::new(PowerClient::new(&config.power).change_context(AppError::Source)?);
    let orchestrator = Arc::new(
        ForecastOrchestrator::from_config(&config.forecast).change_context(AppError::Config)?,
    );
    let presenter: Arc<dyn Presenter> = Arc::new(TerminalPresenter);
    let cancel = CancellationToken::new();

    // ── Presentation ──────────────────────────────────────────────────────────
    let presentation_handle = tokio::spawn(presentation_loop(
        orchestrator.subscribe(),
        Arc::clone(&orchestrator),
        Arc::clone(&presenter),
        cancel.clone(),
    ));

    // ── Secondary forecast service ────────────────────────────────────────────
    let service_handle = if config.service.enabled {
        let service: Arc<dyn ForecastService> =
            Arc::new(ArimaService::new(&config.service).change_context(AppError::Service)?);
        let request = ServiceRequest {
            location,
            parameter: PARAMETER.to_owned(),
            forecast_date: config.service.forecast_date,
        };
        Some(tokio::spawn(request_service_forecast(
            service,
            request,
            Arc::clone(&presenter),
            cancel.clone(),
        )))
    } else {
        None
    };

    // ── Fetch ─────────────────────────────────────────────────────────────────
    let mut refresh_handle = tokio::spawn(refresh(
        source,
        Arc::clone(&orchestrator),
        Arc::clone(&presenter),
        location,
        cancel.clone(),
    ));

    let interrupted = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.change_context(AppError::Runtime)?;
            true
        }
        joined = &mut refresh_handle => {
            joined.change_context(AppError::Runtime)?;
            false
        }
    };

    // ── Shutdown ──────────────────────────────────────────────────────────────
    if interrupted {
        info!("ctrl+c received, shutting down");
        cancel.cancel();
        let _ = tokio::time::timeout(SHUTDOWN_GRACE, refresh_handle).await;
        if let Some(handle) = service_handle {
            let _ = tokio::time::timeout(SHUTDOWN_GRACE, handle).await;
        }
    } else if let Some(handle) = service_handle {
        handle.await.change_context(AppError::Runtime)?;
    }

    cancel.cancel();
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, presentation_handle).await;

    debug!("shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}

/// Fetch, normalize and publish one series. A cancelled or failed fetch
/// leaves the current series untouched.
async fn refresh(
    source: Arc<dyn ClimateSource>,
    orchestrator: Arc<ForecastOrchestrator>,
    presenter: Arc<dyn Presenter>,
    location: Location,
    cancel: CancellationToken,
) {
    presenter.status(&FetchStatus::Loading);

    let fetched = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(source = source.name(), "fetch cancelled");
            return;
        }
        fetched = source.fetch_daily(location) => fetched,
    };

    match fetched {
        Ok(raw) => {
            let series = series::normalize(&raw);
            let status = if series.is_empty() {
                FetchStatus::NoData
            } else {
                FetchStatus::Loaded {
                    count: series.len(),
                }
            };
            orchestrator.replace_series(series);
            presenter.status(&status);
        }
        Err(report) => {
            tracing::warn!(error = ?report, source = source.name(), "fetch failed");
            presenter.status(&fetch_failure_status(&report));
        }
    }
}

fn fetch_failure_status(report: &Report<FetchError>) -> FetchStatus {
    match report.current_context() {
        FetchError::Decode { .. } => FetchStatus::DecodeFailed,
        other => FetchStatus::RequestFailed {
            reason: other.to_string(),
        },
    }
}

/// Redraw whenever the orchestrator publishes a new series.
async fn presentation_loop(
    mut rx: watch::Receiver<Arc<Series>>,
    orchestrator: Arc<ForecastOrchestrator>,
    presenter: Arc<dyn Presenter>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            // A pending replacement is drawn before honouring cancellation.
            biased;
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let series = Arc::clone(&rx.borrow_and_update());
                present(&series, orchestrator.as_ref(), presenter.as_ref());
            }
            _ = cancel.cancelled() => break,
        }
    }
}

fn present(series: &Series, orchestrator: &ForecastOrchestrator, presenter: &dyn Presenter) {
    presenter.series(series);

    for result in orchestrator.forecast_results() {
        match result {
            Ok(forecast) => debug!(method = %forecast.method, value = forecast.value, "forecast"),
            Err(e) => debug!(error = %e.current_context(), "forecast unavailable"),
        }
    }

    match orchestrator.forecasts() {
        Ok(summary) => presenter.forecasts(&summary),
        Err(report) => match report.current_context() {
            ForecastError::InsufficientData { .. } => {
                debug!("no observations, forecasts not shown");
            }
            _ => tracing::warn!(error = ?report, "forecast computation failed"),
        },
    }
}

async fn request_service_forecast(
    service: Arc<dyn ForecastService>,
    request: ServiceRequest,
    presenter: Arc<dyn Presenter>,
    cancel: CancellationToken,
) {
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        result = service.predict(&request) => result,
    };

    match result.change_context(AppError::Service) {
        Ok(forecast) => presenter.service_forecast(&forecast),
        Err(report) => tracing::warn!(error = ?report, "secondary forecast unavailable"),
    }
}
