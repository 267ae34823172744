//! Forecast samples and the cloud-cover adjustment.
//!
//! A [`Forecast`] is fetched once per adjustment. The sample nearest to the
//! target time is selected with [`nearest_sample`]; its cloud fraction is
//! mapped onto a signed shift by [`CloudAdjustmentConfig::shift_for`].

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::error::{ShutterHubError, ValidationError};
use crate::offset::{HourOffset, MAX_OFFSET_HOURS};
use crate::time::Timestamp;

/// Cloud cover at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: Timestamp,
    /// Fraction of the sky covered, `0.0..=1.0`.
    pub cloud_cover: f64,
}

impl ForecastSample {
    /// Build a sample from a cloud percentage (`0..=100`), clamping it into
    /// range.
    #[must_use]
    pub fn from_percent(timestamp: Timestamp, percent: f64) -> Self {
        Self {
            timestamp,
            cloud_cover: (percent / 100.0).clamp(0.0, 1.0),
        }
    }
}

/// A forecast as returned by a weather service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    pub current: Option<ForecastSample>,
    pub hourly: Vec<ForecastSample>,
}

impl Forecast {
    /// Merge `current` and `hourly` into one series sorted by timestamp.
    ///
    /// A `current` sample sharing a timestamp with an hourly one is dropped.
    #[must_use]
    pub fn into_series(self) -> Vec<ForecastSample> {
        let mut series = self.hourly;
        if let Some(current) = self.current
            && !series.iter().any(|s| s.timestamp == current.timestamp)
        {
            series.push(current);
        }
        series.sort_by_key(|s| s.timestamp);
        series
    }
}

/// Samples on either side of a target time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    /// Last sample at or before the target.
    pub earlier: Option<ForecastSample>,
    /// First sample strictly after the target.
    pub later: Option<ForecastSample>,
}

impl Bracket {
    /// Locate the samples around `target` in a series sorted ascending.
    #[must_use]
    pub fn find(series: &[ForecastSample], target: Timestamp) -> Self {
        let split = series.partition_point(|s| s.timestamp <= target);
        Self {
            earlier: split.checked_sub(1).map(|i| series[i]),
            later: series.get(split).copied(),
        }
    }

    /// The sample closest to `target`; ties go to the earlier sample.
    #[must_use]
    pub fn closest(&self, target: Timestamp) -> Option<ForecastSample> {
        match (self.earlier, self.later) {
            (Some(e), Some(l)) => {
                if (target - e.timestamp) <= (l.timestamp - target) {
                    Some(e)
                } else {
                    Some(l)
                }
            }
            (Some(only), None) | (None, Some(only)) => Some(only),
            (None, None) => None,
        }
    }
}

/// Sort `series` and return the sample nearest to `target`.
#[must_use]
pub fn nearest_sample(
    mut series: Vec<ForecastSample>,
    target: Timestamp,
) -> Option<ForecastSample> {
    series.sort_by_key(|s| s.timestamp);
    Bracket::find(&series, target).closest(target)
}

/// Thresholds mapping cloud cover onto a time shift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudAdjustmentConfig {
    /// Below this fraction no shift is applied.
    pub lower_bound: f64,
    /// At or above this fraction the full shift is applied.
    pub upper_bound: f64,
    pub max_shift_hours: f64,
    /// Largest accepted distance between the target and the selected sample.
    pub staleness_secs: u64,
}

impl Default for CloudAdjustmentConfig {
    fn default() -> Self {
        Self {
            lower_bound: 0.35,
            upper_bound: 0.75,
            max_shift_hours: 2.0,
            staleness_secs: 5400,
        }
    }
}

impl CloudAdjustmentConfig {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ShutterHubError::Validation`] when the bounds are not
    /// ordered inside `0..=1`, the shift is out of range, or the staleness
    /// threshold is zero.
    pub fn validate(&self) -> Result<(), ShutterHubError> {
        let ordered = (0.0..=1.0).contains(&self.lower_bound)
            && (0.0..=1.0).contains(&self.upper_bound)
            && self.lower_bound < self.upper_bound;
        if !ordered {
            return Err(ValidationError::CloudBounds {
                lower: self.lower_bound,
                upper: self.upper_bound,
            }
            .into());
        }
        if !(0.0..=MAX_OFFSET_HOURS).contains(&self.max_shift_hours) {
            return Err(ValidationError::MaxShiftOutOfRange(self.max_shift_hours).into());
        }
        if self.staleness_secs == 0 {
            return Err(ValidationError::ZeroStaleness.into());
        }
        Ok(())
    }

    /// Fraction of the maximum shift to apply for `cloud_cover`.
    #[must_use]
    pub fn multiplier(&self, cloud_cover: f64) -> f64 {
        if cloud_cover < self.lower_bound {
            0.0
        } else if cloud_cover >= self.upper_bound {
            1.0
        } else {
            (cloud_cover - self.lower_bound) / (self.upper_bound - self.lower_bound)
        }
    }

    /// Signed shift in hours for `cloud_cover` and `direction`.
    #[must_use]
    pub fn shift_hours(&self, cloud_cover: f64, direction: Direction) -> f64 {
        self.max_shift_hours * self.multiplier(cloud_cover) * direction.shift_sign()
    }

    /// Signed shift as a [`TimeDelta`], decomposed like solar offsets.
    #[must_use]
    pub fn shift_for(&self, cloud_cover: f64, direction: Direction) -> TimeDelta {
        HourOffset::from_hours(self.shift_hours(cloud_cover, direction)).to_delta()
    }

    /// Whether `sample` is too far from `target` to be trusted.
    ///
    /// The same tolerance applies before and after the target.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn is_stale(&self, sample: &ForecastSample, target: Timestamp) -> bool {
        (sample.timestamp - target).num_seconds().abs() > self.staleness_secs as i64
    }
}
