//! Forecast port — cloud-cover forecasts from a weather service.

use std::future::Future;

use shutterhub_domain::forecast::Forecast;
use shutterhub_domain::location::Location;

/// Errors a forecast source may report.
///
/// Every variant is recoverable: callers fall back to unadjusted times.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    /// The request never produced a response.
    #[error("forecast request failed")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("forecast request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("forecast service returned status {status}")]
    Status { status: u16 },

    /// The payload lacked timestamps or cloud fields, or was not valid JSON.
    #[error("malformed forecast payload")]
    Malformed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// No forecast source is configured.
    #[error("forecast source disabled")]
    Unavailable,
}

/// Fetches a forecast for a location. One call per adjustment; nothing is
/// cached between calls.
pub trait ForecastProvider {
    fn fetch(
        &self,
        location: Location,
    ) -> impl Future<Output = Result<Forecast, ForecastError>> + Send;
}

impl<T: ForecastProvider + Send + Sync> ForecastProvider for std::sync::Arc<T> {
    fn fetch(
        &self,
        location: Location,
    ) -> impl Future<Output = Result<Forecast, ForecastError>> + Send {
        (**self).fetch(location)
    }
}
