//! Forecast provider used when weather adjustment is switched off.

use std::future::Future;

use shutterhub_domain::forecast::Forecast;
use shutterhub_domain::location::Location;

use crate::ports::{ForecastError, ForecastProvider};

/// Always reports [`ForecastError::Unavailable`], so every adjustment falls
/// back to the raw solar time.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoForecast;

impl ForecastProvider for NoForecast {
    fn fetch(
        &self,
        _location: Location,
    ) -> impl Future<Output = Result<Forecast, ForecastError>> + Send {
        async { Err(ForecastError::Unavailable) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_always_report_unavailable() {
        let location = Location::new(10.0, 10.0).unwrap();
        let result = NoForecast.fetch(location).await;
        assert!(matches!(result, Err(ForecastError::Unavailable)));
    }
}
