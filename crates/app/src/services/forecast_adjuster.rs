//! Forecast adjuster — shifts a raw solar time by forecast cloud cover.
//!
//! One forecast fetch per call. Any failure (transport, timeout, bad
//! status, malformed or empty series, stale sample) degrades to the raw
//! time; weather never blocks the shutter schedule.

use shutterhub_domain::direction::Direction;
use shutterhub_domain::forecast::{CloudAdjustmentConfig, nearest_sample};
use shutterhub_domain::location::Location;
use shutterhub_domain::time::Timestamp;

use crate::ports::ForecastProvider;

/// Result of one adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    pub time: Timestamp,
    /// Cloud fraction that drove the shift, `None` when skipped.
    pub cloud_cover: Option<f64>,
}

impl Adjustment {
    fn unadjusted(time: Timestamp) -> Self {
        Self {
            time,
            cloud_cover: None,
        }
    }
}

/// Applies the cloud-cover shift to solar event times.
pub struct ForecastAdjuster<F> {
    provider: F,
    location: Location,
    config: CloudAdjustmentConfig,
}

impl<F: ForecastProvider> ForecastAdjuster<F> {
    /// Create an adjuster fetching forecasts for `location`.
    pub fn new(provider: F, location: Location, config: CloudAdjustmentConfig) -> Self {
        Self {
            provider,
            location,
            config,
        }
    }

    /// Shift `raw` according to the forecast nearest to it.
    pub async fn adjust(&self, raw: Timestamp, direction: Direction) -> Adjustment {
        let forecast = match self.provider.fetch(self.location).await {
            Ok(forecast) => forecast,
            Err(err) => {
                tracing::warn!(
                    %direction,
                    error = %err,
                    "forecast unavailable, keeping solar time"
                );
                return Adjustment::unadjusted(raw);
            }
        };

        let Some(sample) = nearest_sample(forecast.into_series(), raw) else {
            tracing::warn!(%direction, "forecast series empty, keeping solar time");
            return Adjustment::unadjusted(raw);
        };

        if self.config.is_stale(&sample, raw) {
            tracing::warn!(
                %direction,
                target = %raw,
                sample_at = %sample.timestamp,
                staleness_secs = self.config.staleness_secs,
                "forecast too far from target time, keeping solar time"
            );
            return Adjustment::unadjusted(raw);
        }

        let shift = self.config.shift_for(sample.cloud_cover, direction);
        let adjusted = raw + shift;
        tracing::info!(
            %direction,
            cloud_cover = sample.cloud_cover,
            shift_minutes = shift.num_minutes(),
            raw = %raw,
            adjusted = %adjusted,
            "applied cloud adjustment"
        );
        Adjustment {
            time: adjusted,
            cloud_cover: Some(sample.cloud_cover),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ForecastError;
    use chrono::{TimeDelta, TimeZone, Utc};
    use shutterhub_domain::forecast::{Forecast, ForecastSample};
    use std::future::Future;
    use std::sync::Mutex;

    // ── Scripted forecast provider ─────────────────────────────────

    enum Script {
        Reply(Forecast),
        Fail(fn() -> ForecastError),
    }

    struct ScriptedProvider {
        script: Script,
        calls: Mutex<usize>,
    }

    impl ScriptedProvider {
        fn reply(forecast: Forecast) -> Self {
            Self {
                script: Script::Reply(forecast),
                calls: Mutex::new(0),
            }
        }

        fn fail(make: fn() -> ForecastError) -> Self {
            Self {
                script: Script::Fail(make),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl ForecastProvider for ScriptedProvider {
        fn fetch(
            &self,
            _location: Location,
        ) -> impl Future<Output = Result<Forecast, ForecastError>> + Send {
            *self.calls.lock().unwrap() += 1;
            let result = match &self.script {
                Script::Reply(forecast) => Ok(forecast.clone()),
                Script::Fail(make) => Err(make()),
            };
            async { result }
        }
    }

    fn at(h: u32, m: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 4, 15, h, m, 0).unwrap()
    }

    fn hourly(points: &[(u32, f64)]) -> Forecast {
        Forecast {
            current: None,
            hourly: points
                .iter()
                .map(|&(h, cloud)| ForecastSample {
                    timestamp: at(h, 0),
                    cloud_cover: cloud,
                })
                .collect(),
        }
    }

    fn adjuster(provider: ScriptedProvider) -> ForecastAdjuster<ScriptedProvider> {
        ForecastAdjuster::new(
            provider,
            Location::new(48.0, 11.0).unwrap(),
            CloudAdjustmentConfig::default(),
        )
    }

    #[tokio::test]
    async fn should_delay_opening_on_partly_cloudy_morning() {
        // Raw 06:00 plus +1h offset = 07:00; cloud 0.55 → +1h → 08:00.
        let raw = at(7, 0);
        let adj = adjuster(ScriptedProvider::reply(hourly(&[(6, 0.1), (7, 0.55), (8, 0.9)])));

        let result = adj.adjust(raw, Direction::Open).await;

        assert_eq!(result.time, at(8, 0));
        assert!((result.cloud_cover.unwrap() - 0.55).abs() < 1e-12);
    }

    #[tokio::test]
    async fn should_advance_closing_on_overcast_evening() {
        let adj = adjuster(ScriptedProvider::reply(hourly(&[(19, 0.95), (20, 0.95)])));

        let result = adj.adjust(at(20, 10), Direction::Close).await;

        assert_eq!(result.time, at(18, 10));
    }

    #[tokio::test]
    async fn should_not_shift_on_clear_sky() {
        let adj = adjuster(ScriptedProvider::reply(hourly(&[(7, 0.05)])));

        let result = adj.adjust(at(7, 0), Direction::Open).await;

        assert_eq!(result.time, at(7, 0));
        assert_eq!(result.cloud_cover, Some(0.05));
    }

    #[tokio::test]
    async fn should_keep_raw_time_when_fetch_times_out() {
        let provider = ScriptedProvider::fail(|| ForecastError::Timeout);
        let adj = adjuster(provider);

        let result = adj.adjust(at(7, 0), Direction::Open).await;

        assert_eq!(result, Adjustment::unadjusted(at(7, 0)));
        assert_eq!(adj.provider.calls(), 1);
    }

    #[tokio::test]
    async fn should_keep_raw_time_when_service_errors() {
        let adj = adjuster(ScriptedProvider::fail(|| ForecastError::Status { status: 503 }));

        let result = adj.adjust(at(19, 0), Direction::Close).await;

        assert_eq!(result.time, at(19, 0));
        assert!(result.cloud_cover.is_none());
    }

    #[tokio::test]
    async fn should_keep_raw_time_when_series_empty() {
        let adj = adjuster(ScriptedProvider::reply(Forecast::default()));

        let result = adj.adjust(at(7, 0), Direction::Open).await;

        assert_eq!(result, Adjustment::unadjusted(at(7, 0)));
    }

    #[tokio::test]
    async fn should_keep_raw_time_when_nearest_sample_is_stale() {
        // Nearest sample is 3h away; default tolerance is 1.5h.
        let adj = adjuster(ScriptedProvider::reply(hourly(&[(4, 0.9)])));

        let result = adj.adjust(at(7, 0), Direction::Open).await;

        assert_eq!(result, Adjustment::unadjusted(at(7, 0)));
    }

    #[tokio::test]
    async fn should_use_current_sample_when_hourly_missing() {
        let forecast = Forecast {
            current: Some(ForecastSample {
                timestamp: at(6, 45),
                cloud_cover: 1.0,
            }),
            hourly: Vec::new(),
        };
        let adj = adjuster(ScriptedProvider::reply(forecast));

        let result = adj.adjust(at(7, 0), Direction::Open).await;

        assert_eq!(result.time - at(7, 0), TimeDelta::hours(2));
    }

    #[tokio::test]
    async fn should_fetch_once_per_adjustment() {
        let adj = adjuster(ScriptedProvider::reply(hourly(&[(7, 0.5)])));

        adj.adjust(at(7, 0), Direction::Open).await;
        adj.adjust(at(19, 0), Direction::Close).await;

        assert_eq!(adj.provider.calls(), 2);
    }
}
