//! Solar event calculator — raw open/close times from the sun's elevation.
//!
//! Crossings of the anchor elevations come from NREL's Solar Position
//! Algorithm (`solar_positioning::spa`). Each date is evaluated at the
//! location's mean solar offset, so the computed pair brackets the solar
//! noon of that date.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use solar_positioning::time::DeltaT;
use solar_positioning::{Horizon, SunriseResult, spa};

use crate::error::AstronomicalError;
use crate::location::Location;
use crate::offset::OffsetConfig;
use crate::time::Timestamp;

/// Elevation bounding golden hour on the bright side, in degrees.
pub const GOLDEN_HOUR_ELEVATION: f64 = 6.0;

/// Morning anchor for the open event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenAnchor {
    Sunrise,
    #[default]
    GoldenHourEnd,
}

impl OpenAnchor {
    fn horizon(self) -> Horizon {
        match self {
            Self::Sunrise => Horizon::SunriseSunset,
            Self::GoldenHourEnd => Horizon::Custom(GOLDEN_HOUR_ELEVATION),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Sunrise => "sunrise",
            Self::GoldenHourEnd => "end of golden hour",
        }
    }
}

/// Evening anchor for the close event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseAnchor {
    GoldenHourStart,
    Sunset,
    #[default]
    Dusk,
}

impl CloseAnchor {
    fn horizon(self) -> Horizon {
        match self {
            Self::GoldenHourStart => Horizon::Custom(GOLDEN_HOUR_ELEVATION),
            Self::Sunset => Horizon::SunriseSunset,
            Self::Dusk => Horizon::CivilTwilight,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::GoldenHourStart => "start of golden hour",
            Self::Sunset => "sunset",
            Self::Dusk => "dusk",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Crossing {
    Rising,
    Setting,
}

/// Open and close times for one date, offsets applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayEvents {
    pub open: Timestamp,
    pub close: Timestamp,
}

/// Derives raw (not weather-adjusted) open/close times for a location.
#[derive(Debug, Clone, Copy)]
pub struct SolarEventCalculator {
    location: Location,
    offsets: OffsetConfig,
    open_anchor: OpenAnchor,
    close_anchor: CloseAnchor,
}

impl SolarEventCalculator {
    /// Create a calculator with the default golden-hour/dusk anchors.
    #[must_use]
    pub fn new(location: Location, offsets: OffsetConfig) -> Self {
        Self {
            location,
            offsets,
            open_anchor: OpenAnchor::default(),
            close_anchor: CloseAnchor::default(),
        }
    }

    #[must_use]
    pub fn with_anchors(mut self, open: OpenAnchor, close: CloseAnchor) -> Self {
        self.open_anchor = open;
        self.close_anchor = close;
        self
    }

    #[must_use]
    pub fn location(&self) -> Location {
        self.location
    }

    /// Compute the open and close times for `date`.
    ///
    /// # Errors
    ///
    /// Returns [`AstronomicalError::NoEvent`] when the sun never crosses an
    /// anchor elevation on that date (polar day or night), and
    /// [`AstronomicalError::Ephemeris`] when the position algorithm rejects
    /// its inputs.
    pub fn compute_raw_events(&self, date: NaiveDate) -> Result<DayEvents, AstronomicalError> {
        let open = self.crossing(
            date,
            self.open_anchor.horizon(),
            Crossing::Rising,
            self.open_anchor.label(),
        )?;
        let close = self.crossing(
            date,
            self.close_anchor.horizon(),
            Crossing::Setting,
            self.close_anchor.label(),
        )?;

        Ok(DayEvents {
            open: open + self.offsets.open().to_delta(),
            close: close + self.offsets.close().to_delta(),
        })
    }

    /// Instant the sun crosses `horizon` on `date`.
    fn crossing(
        &self,
        date: NaiveDate,
        horizon: Horizon,
        crossing: Crossing,
        event: &'static str,
    ) -> Result<Timestamp, AstronomicalError> {
        let midnight = self
            .solar_midnight(date)
            .ok_or(AstronomicalError::DateOutOfRange(date))?;
        let delta_t = DeltaT::estimate_from_date_like(date)?;
        let result = spa::sunrise_sunset_for_horizon(
            midnight,
            self.location.latitude,
            self.location.longitude,
            delta_t,
            horizon,
        )?;

        match (result, crossing) {
            (SunriseResult::RegularDay { sunrise, .. }, Crossing::Rising) => {
                Ok(sunrise.with_timezone(&Utc))
            }
            (SunriseResult::RegularDay { sunset, .. }, Crossing::Setting) => {
                Ok(sunset.with_timezone(&Utc))
            }
            (SunriseResult::AllDay { .. } | SunriseResult::AllNight { .. }, _) => {
                Err(AstronomicalError::NoEvent {
                    event,
                    date,
                    latitude: self.location.latitude,
                })
            }
        }
    }

    /// Start of `date` in local mean solar time.
    fn solar_midnight(&self, date: NaiveDate) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt(self.location.mean_solar_offset_secs())?;
        date.and_time(NaiveTime::MIN)
            .and_local_timezone(offset)
            .single()
    }
}
