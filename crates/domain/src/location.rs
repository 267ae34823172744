//! Location — where the shutters are.

use chrono::{NaiveDate, TimeDelta};

use crate::error::{ShutterHubError, ValidationError};
use crate::time::Timestamp;

/// Geographic coordinates in degrees (north and east positive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Build a location after checking coordinate ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ShutterHubError::Validation`] when latitude or longitude is
    /// out of range or not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ShutterHubError> {
        let location = Self {
            latitude,
            longitude,
        };
        location.validate()?;
        Ok(location)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ShutterHubError::Validation`] for out-of-range coordinates.
    pub fn validate(&self) -> Result<(), ShutterHubError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::LatitudeOutOfRange(self.latitude).into());
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::LongitudeOutOfRange(self.longitude).into());
        }
        Ok(())
    }

    /// Calendar date of local mean solar time at this longitude.
    ///
    /// The open/close pair computed for this date brackets the same solar
    /// noon, so an instant between them always maps back to that date.
    #[must_use]
    pub fn solar_date(&self, instant: Timestamp) -> NaiveDate {
        let shift = TimeDelta::seconds(i64::from(self.mean_solar_offset_secs()));
        (instant + shift).date_naive()
    }

    /// Offset of local mean solar time from UTC, four minutes per degree.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn mean_solar_offset_secs(&self) -> i32 {
        (self.longitude * 240.0).round() as i32
    }
}
