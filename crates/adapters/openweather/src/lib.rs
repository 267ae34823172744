//! # shutterhub-adapter-openweather
//!
//! [`ForecastProvider`] backed by the OpenWeatherMap One Call API.
//!
//! ## Request
//!
//! `GET {base_url}/data/3.0/onecall?lat=..&lon=..&appid=..&exclude=minutely,daily,alerts`
//!
//! ## Error mapping
//!
//! | Failure | [`ForecastError`] |
//! |---------|-------------------|
//! | request exceeded the configured timeout | `Timeout` |
//! | connection, DNS or TLS failure | `Transport` |
//! | non-2xx status | `Status` |
//! | invalid JSON, missing `dt`/`clouds` | `Malformed` |
//!
//! ## Dependency rule
//!
//! Depends on `shutterhub-app` and `shutterhub-domain` only.

mod config;
mod payload;

pub use config::{DEFAULT_BASE_URL, OpenWeatherConfig};
pub use payload::PayloadError;

use std::future::Future;

use shutterhub_app::ports::{ForecastError, ForecastProvider};
use shutterhub_domain::forecast::Forecast;
use shutterhub_domain::location::Location;

use crate::payload::OneCallResponse;

const EXCLUDED_BLOCKS: &str = "minutely,daily,alerts";

/// Fetches cloud-cover forecasts over HTTP.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    config: OpenWeatherConfig,
    client: reqwest::Client,
}

impl OpenWeatherProvider {
    /// Build a provider with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns the [`reqwest::Error`] raised when the TLS backend cannot be
    /// initialised.
    pub fn new(config: OpenWeatherConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    async fn fetch_forecast(&self, location: Location) -> Result<Forecast, ForecastError> {
        tracing::debug!(
            latitude = location.latitude,
            longitude = location.longitude,
            "requesting forecast"
        );
        let response = self
            .client
            .get(self.config.onecall_url())
            .query(&[
                ("lat", location.latitude.to_string()),
                ("lon", location.longitude.to_string()),
            ])
            .query(&[
                ("appid", self.config.api_key.as_str()),
                ("exclude", EXCLUDED_BLOCKS),
            ])
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(request_error)?;
        let decoded: OneCallResponse =
            serde_json::from_slice(&body).map_err(|err| ForecastError::Malformed(Box::new(err)))?;
        let forecast = decoded
            .into_forecast()
            .map_err(|err| ForecastError::Malformed(Box::new(err)))?;

        tracing::debug!(
            has_current = forecast.current.is_some(),
            hourly = forecast.hourly.len(),
            "forecast received"
        );
        Ok(forecast)
    }
}

fn request_error(err: reqwest::Error) -> ForecastError {
    if err.is_timeout() {
        ForecastError::Timeout
    } else {
        ForecastError::Transport(Box::new(err))
    }
}

impl ForecastProvider for OpenWeatherProvider {
    fn fetch(
        &self,
        location: Location,
    ) -> impl Future<Output = Result<Forecast, ForecastError>> + Send {
        self.fetch_forecast(location)
    }
}
