//! Time and timestamp helpers.

use chrono::{DateTime, TimeDelta, Utc};

/// UTC timestamp used for solar events, forecast samples and trigger times.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Convert a non-negative [`TimeDelta`] into a [`std::time::Duration`].
///
/// Negative deltas clamp to zero.
#[must_use]
pub fn to_std_duration(delta: TimeDelta) -> std::time::Duration {
    delta.to_std().unwrap_or_default()
}
