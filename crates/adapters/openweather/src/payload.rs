//! One Call response body and its conversion into a [`Forecast`].
//!
//! Only `current` and `hourly` are read; both are optional in the payload,
//! but every entry present must carry `dt` (unix seconds) and `clouds`
//! (percent).

use chrono::DateTime;
use serde::Deserialize;
use shutterhub_domain::forecast::{Forecast, ForecastSample};

/// Why a decoded payload could not become a [`Forecast`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PayloadError {
    #[error("{section} entry is missing `{field}`")]
    MissingField {
        section: &'static str,
        field: &'static str,
    },

    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),
}

#[derive(Debug, Deserialize)]
pub(crate) struct OneCallResponse {
    #[serde(default)]
    current: Option<RawSample>,
    #[serde(default)]
    hourly: Vec<RawSample>,
}

#[derive(Debug, Deserialize)]
struct RawSample {
    dt: Option<i64>,
    clouds: Option<f64>,
}

impl RawSample {
    fn into_sample(self, section: &'static str) -> Result<ForecastSample, PayloadError> {
        let dt = self.dt.ok_or(PayloadError::MissingField {
            section,
            field: "dt",
        })?;
        let clouds = self.clouds.ok_or(PayloadError::MissingField {
            section,
            field: "clouds",
        })?;
        let timestamp = DateTime::from_timestamp(dt, 0).ok_or(PayloadError::InvalidTimestamp(dt))?;
        Ok(ForecastSample::from_percent(timestamp, clouds))
    }
}

impl OneCallResponse {
    pub(crate) fn into_forecast(self) -> Result<Forecast, PayloadError> {
        let current = self
            .current
            .map(|raw| raw.into_sample("current"))
            .transpose()?;
        let hourly = self
            .hourly
            .into_iter()
            .map(|raw| raw.into_sample("hourly"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Forecast { current, hourly })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn decode(value: serde_json::Value) -> Result<Forecast, PayloadError> {
        serde_json::from_value::<OneCallResponse>(value)
            .unwrap()
            .into_forecast()
    }

    #[test]
    fn should_convert_current_and_hourly_samples() {
        let forecast = decode(json!({
            "lat": 52.52,
            "lon": 13.4,
            "current": { "dt": 1_713_157_200, "clouds": 40, "temp": 281.2 },
            "hourly": [
                { "dt": 1_713_160_800, "clouds": 75 },
                { "dt": 1_713_164_400, "clouds": 100 }
            ]
        }))
        .unwrap();

        let current = forecast.current.unwrap();
        assert_eq!(
            current.timestamp,
            Utc.with_ymd_and_hms(2024, 4, 15, 5, 0, 0).unwrap()
        );
        assert!((current.cloud_cover - 0.4).abs() < 1e-12);
        assert_eq!(forecast.hourly.len(), 2);
        assert!((forecast.hourly[1].cloud_cover - 1.0).abs() < 1e-12);
    }

    #[test]
    fn should_accept_payload_without_hourly() {
        let forecast = decode(json!({ "current": { "dt": 0, "clouds": 10 } })).unwrap();
        assert!(forecast.current.is_some());
        assert!(forecast.hourly.is_empty());
    }

    #[test]
    fn should_accept_empty_payload() {
        let forecast = decode(json!({})).unwrap();
        assert_eq!(forecast, Forecast::default());
    }

    #[test]
    fn should_reject_hourly_entry_without_clouds() {
        let err = decode(json!({ "hourly": [{ "dt": 1_713_160_800 }] })).unwrap_err();
        assert_eq!(
            err,
            PayloadError::MissingField {
                section: "hourly",
                field: "clouds"
            }
        );
    }

    #[test]
    fn should_reject_current_without_timestamp() {
        let err = decode(json!({ "current": { "clouds": 20 } })).unwrap_err();
        assert_eq!(err.to_string(), "current entry is missing `dt`");
    }

    #[test]
    fn should_reject_out_of_range_timestamp() {
        let err = decode(json!({ "hourly": [{ "dt": i64::MAX, "clouds": 5 }] })).unwrap_err();
        assert_eq!(err, PayloadError::InvalidTimestamp(i64::MAX));
    }
}
