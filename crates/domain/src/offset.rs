//! Fractional-hour offsets and their hour/minute decomposition.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::{ShutterHubError, ValidationError};

/// Largest offset magnitude accepted anywhere, in hours.
pub const MAX_OFFSET_HOURS: f64 = 12.0;

/// A signed offset split into a whole-hour part and a minute remainder.
///
/// The whole-hour part truncates toward zero and the minute remainder
/// carries the sign of the original value, so `-0.25` becomes
/// `0 h, -15 min` rather than `-1 h, +45 min`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourOffset {
    pub hours: i64,
    pub minutes: f64,
}

impl HourOffset {
    /// Decompose a fractional number of hours.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_hours(value: f64) -> Self {
        let whole = value.trunc();
        let minutes = (value.abs() - whole.abs()) * 60.0;
        Self {
            hours: whole as i64,
            minutes: if value.is_sign_negative() {
                -minutes
            } else {
                minutes
            },
        }
    }

    /// Recombine into fractional hours.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_hours(self) -> f64 {
        self.hours as f64 + self.minutes / 60.0
    }

    /// Convert to a [`TimeDelta`] with millisecond resolution.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_delta(self) -> TimeDelta {
        let millis = (self.minutes * 60_000.0).round() as i64;
        TimeDelta::hours(self.hours) + TimeDelta::milliseconds(millis)
    }
}

/// Hours added to the raw solar anchors (may be negative).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetConfig {
    pub open_offset_hours: f64,
    pub close_offset_hours: f64,
}

impl Default for OffsetConfig {
    fn default() -> Self {
        Self {
            open_offset_hours: 1.0,
            close_offset_hours: 1.0,
        }
    }
}

impl OffsetConfig {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ShutterHubError::Validation`] when an offset is not finite
    /// or exceeds [`MAX_OFFSET_HOURS`] in magnitude.
    pub fn validate(&self) -> Result<(), ShutterHubError> {
        for value in [self.open_offset_hours, self.close_offset_hours] {
            if !(-MAX_OFFSET_HOURS..=MAX_OFFSET_HOURS).contains(&value) {
                return Err(ValidationError::OffsetOutOfRange(value).into());
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn open(&self) -> HourOffset {
        HourOffset::from_hours(self.open_offset_hours)
    }

    #[must_use]
    pub fn close(&self) -> HourOffset {
        HourOffset::from_hours(self.close_offset_hours)
    }
}
