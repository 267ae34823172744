//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`ShutterHubError`] via `#[from]`.

use chrono::NaiveDate;

/// Top-level domain error.
#[derive(Debug, thiserror::Error)]
pub enum ShutterHubError {
    /// A value violated a domain invariant.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The sun position could not produce a requested event.
    #[error("astronomical computation error")]
    Astronomical(#[from] AstronomicalError),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("offset of {0} hours is outside [-12, 12]")]
    OffsetOutOfRange(f64),

    #[error("cloud bounds must satisfy 0 <= lower ({lower}) < upper ({upper}) <= 1")]
    CloudBounds { lower: f64, upper: f64 },

    #[error("maximum shift of {0} hours is outside [0, 12]")]
    MaxShiftOutOfRange(f64),

    #[error("staleness threshold must be positive")]
    ZeroStaleness,
}

/// Solar events that cannot be computed for a given date.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AstronomicalError {
    #[error("no {event} on {date} at latitude {latitude}")]
    NoEvent {
        event: &'static str,
        date: NaiveDate,
        latitude: f64,
    },

    #[error("no calendar day follows {0}")]
    DateOutOfRange(NaiveDate),

    #[error("solar position algorithm failed")]
    Ephemeris(#[from] solar_positioning::Error),
}
