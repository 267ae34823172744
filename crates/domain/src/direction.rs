//! Direction — which way the shutters move, and the solar event bound to it.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Movement requested from the shutter controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Open,
    Close,
}

impl Direction {
    /// Sign applied to cloud-driven shifts.
    ///
    /// Overcast mornings delay opening (`+1`), overcast evenings advance
    /// closing (`-1`).
    #[must_use]
    pub fn shift_sign(self) -> f64 {
        match self {
            Self::Open => 1.0,
            Self::Close => -1.0,
        }
    }

    /// Past participle used in log lines (`"opened"`, `"closed"`).
    #[must_use]
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Open => "opened",
            Self::Close => "closed",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => f.write_str("open"),
            Self::Close => f.write_str("close"),
        }
    }
}

/// A point in time at which the shutters should move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarEvent {
    pub at: Timestamp,
    pub direction: Direction,
}

impl SolarEvent {
    #[must_use]
    pub fn open(at: Timestamp) -> Self {
        Self {
            at,
            direction: Direction::Open,
        }
    }

    #[must_use]
    pub fn close(at: Timestamp) -> Self {
        Self {
            at,
            direction: Direction::Close,
        }
    }
}
