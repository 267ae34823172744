//! # shutterhubd — shutterhub daemon
//!
//! Composition root that wires the adapters together and runs the scheduler.
//!
//! ## Responsibilities
//! - Load and validate configuration (file, then environment overrides)
//! - Install the `tracing` subscriber
//! - Construct the forecast provider and shutter device adapters
//! - Construct application services, injecting adapters via port traits
//! - Run the trigger scheduler until SIGINT/SIGTERM
//!
//! ## Exit codes
//! - `0` clean shutdown
//! - `1` an HTTP client could not be initialised
//! - `2` configuration error
//! - `3` solar events cannot be computed for the configured location
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::process::ExitCode;

use shutterhub_adapter_openweather::OpenWeatherProvider;
use shutterhub_adapter_shutter_http::HttpShutterDevice;
use shutterhub_app::no_forecast::NoForecast;
use shutterhub_app::ports::{ForecastProvider, SystemClock};
use shutterhub_app::services::actuation_service::ActuationService;
use shutterhub_app::services::forecast_adjuster::ForecastAdjuster;
use shutterhub_app::services::trigger_scheduler::TriggerScheduler;
use shutterhub_app::shutdown::{self, Shutdown, ShutdownHandle};
use shutterhub_domain::error::AstronomicalError;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, DEFAULT_LOG_FILTER};

const EXIT_STARTUP: u8 = 1;
const EXIT_CONFIG: u8 = 2;
const EXIT_ASTRONOMICAL: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            init_tracing(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
            );
            tracing::error!(error = %error_chain(&err), "invalid configuration");
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    init_tracing(
        EnvFilter::try_new(&config.logging.filter)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    );
    tracing::info!(
        latitude = config.location.latitude,
        longitude = config.location.longitude,
        open_anchor = ?config.solar.open_anchor,
        close_anchor = ?config.solar.close_anchor,
        weather = config.weather.enabled,
        "shutterhubd starting"
    );
    tracing::debug!(?config, "configuration loaded");

    let device = match HttpShutterDevice::new(config.shutter_http()) {
        Ok(device) => device,
        Err(err) => {
            tracing::error!(error = %error_chain(&err), "cannot build shutter client");
            return ExitCode::from(EXIT_STARTUP);
        }
    };
    let actuator = ActuationService::new(device, config.retry_policy());

    let (handle, signal) = shutdown::channel();
    tokio::spawn(forward_signals(handle));

    let result = match config.openweather() {
        Some(weather) => match OpenWeatherProvider::new(weather) {
            Ok(provider) => run(&config, provider, actuator, signal).await,
            Err(err) => {
                tracing::error!(error = %error_chain(&err), "cannot build forecast client");
                return ExitCode::from(EXIT_STARTUP);
            }
        },
        None => {
            tracing::info!("weather adjustment disabled, using raw solar times");
            run(&config, NoForecast, actuator, signal).await
        }
    };

    match result {
        Ok(()) => {
            tracing::info!("shutterhubd stopped");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(
                error = %error_chain(&err),
                "cannot schedule shutters at this location"
            );
            ExitCode::from(EXIT_ASTRONOMICAL)
        }
    }
}

async fn run<F: ForecastProvider>(
    config: &Config,
    provider: F,
    actuator: ActuationService<HttpShutterDevice>,
    signal: Shutdown,
) -> Result<(), AstronomicalError> {
    let adjuster = ForecastAdjuster::new(provider, config.location, config.cloud_adjustment());
    let scheduler = TriggerScheduler::new(
        config.calculator(),
        adjuster,
        actuator,
        SystemClock,
        config.cooldown(),
    );
    scheduler.run(signal).await
}

fn init_tracing(filter: EnvFilter) {
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Render an error with all of its sources on one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

async fn forward_signals(handle: ShutdownHandle) {
    wait_for_signal().await;
    tracing::info!("shutdown requested");
    handle.trigger();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            tracing::warn!(error = %err, "cannot listen for SIGTERM");
            return wait_for_ctrl_c().await;
        }
    };
    tokio::select! {
        () = wait_for_ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn should_join_error_sources() {
        let err = ConfigError::Parse(toml::from_str::<toml::Table>("invalid {{{").unwrap_err());
        let chain = error_chain(&err);
        assert!(chain.starts_with("failed to parse config file: "));
        assert!(chain.len() > "failed to parse config file: ".len());
    }

    #[test]
    fn should_render_error_without_source() {
        let err = ConfigError::MissingField("device.login");
        assert_eq!(error_chain(&err), "missing required setting `device.login`");
    }
}
