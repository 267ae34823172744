//! Next-trigger selection.

use chrono::TimeDelta;

use crate::direction::SolarEvent;
use crate::solar::DayEvents;
use crate::time::Timestamp;

/// The event that fires next and how long to wait for it.
///
/// Recomputed on every scheduler cycle; never carried across cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTrigger {
    pub event: SolarEvent,
    pub wait: TimeDelta,
}

impl PendingTrigger {
    /// Build a trigger for `event` as seen from `now`. The wait is never
    /// negative.
    #[must_use]
    pub fn new(event: SolarEvent, now: Timestamp) -> Self {
        Self {
            event,
            wait: (event.at - now).max(TimeDelta::zero()),
        }
    }
}

/// Pick today's pending event, if any.
///
/// Returns the open event when `now` is before it, otherwise the close
/// event when `now` is before that. `None` means both have passed and the
/// next trigger is tomorrow's open event.
#[must_use]
pub fn next_event_today(now: Timestamp, today: &DayEvents) -> Option<SolarEvent> {
    if now < today.open {
        Some(SolarEvent::open(today.open))
    } else if now < today.close {
        Some(SolarEvent::close(today.close))
    } else {
        None
    }
}
