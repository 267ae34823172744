//! Trigger scheduler: the compute, wait, fire loop.
//!
//! Every cycle starts from a freshly sampled "now": solar events for the
//! current solar date are computed and weather-adjusted, the next pending
//! event is picked, the scheduler sleeps until it is due, fires the
//! actuation, and sleeps for a fixed cooldown. Nothing is carried over
//! between cycles, so a restart at any time produces the correct next event.

use std::time::Duration;

use chrono::{NaiveDate, TimeDelta};
use shutterhub_domain::direction::{Direction, SolarEvent};
use shutterhub_domain::error::AstronomicalError;
use shutterhub_domain::schedule::{PendingTrigger, next_event_today};
use shutterhub_domain::solar::{DayEvents, SolarEventCalculator};
use shutterhub_domain::time::{Timestamp, to_std_duration};

use crate::ports::{Clock, ForecastProvider, ShutterDevice};
use crate::services::actuation_service::{ActuationOutcome, ActuationService};
use crate::services::forecast_adjuster::ForecastAdjuster;
use crate::shutdown::Shutdown;

/// How a single cycle ended.
#[derive(Debug)]
pub enum CycleEnd {
    /// The trigger fired and the cooldown elapsed.
    Fired {
        event: SolarEvent,
        outcome: ActuationOutcome,
    },
    /// Shutdown interrupted the wait, a retry or the cooldown.
    Cancelled,
}

/// The scheduler loop, generic over its ports.
pub struct TriggerScheduler<F, D, C> {
    calculator: SolarEventCalculator,
    adjuster: ForecastAdjuster<F>,
    actuator: ActuationService<D>,
    clock: C,
    cooldown: Duration,
}

impl<F, D, C> TriggerScheduler<F, D, C>
where
    F: ForecastProvider,
    D: ShutterDevice,
    C: Clock,
{
    pub fn new(
        calculator: SolarEventCalculator,
        adjuster: ForecastAdjuster<F>,
        actuator: ActuationService<D>,
        clock: C,
        cooldown: Duration,
    ) -> Self {
        Self {
            calculator,
            adjuster,
            actuator,
            clock,
            cooldown,
        }
    }

    /// Run cycles until shutdown is requested.
    ///
    /// # Errors
    ///
    /// Returns the [`AstronomicalError`] of the very first cycle, which
    /// points at bad coordinates. Later astronomical failures are logged and
    /// retried after the next UTC midnight.
    pub async fn run(&self, shutdown: Shutdown) -> Result<(), AstronomicalError> {
        let mut first_cycle = true;
        loop {
            if shutdown.is_triggered() {
                break;
            }
            match self.run_cycle(&shutdown).await {
                Ok(CycleEnd::Fired { .. }) => {}
                Ok(CycleEnd::Cancelled) => break,
                Err(err) if first_cycle => return Err(err),
                Err(err) => {
                    let wait = until_next_midnight(self.clock.now());
                    tracing::error!(
                        error = %err,
                        retry_in_secs = wait.as_secs(),
                        "cannot compute solar events, retrying after midnight"
                    );
                    if !shutdown.sleep(wait).await {
                        break;
                    }
                }
            }
            first_cycle = false;
        }
        tracing::info!("scheduler stopped");
        Ok(())
    }

    /// One COMPUTE → WAIT → FIRE pass, followed by the cooldown.
    ///
    /// # Errors
    ///
    /// Returns an [`AstronomicalError`] when the solar events cannot be
    /// computed for the current or following date.
    pub async fn run_cycle(&self, shutdown: &Shutdown) -> Result<CycleEnd, AstronomicalError> {
        let now = self.clock.now();
        let trigger = self.compute(now).await?;
        tracing::info!(
            direction = %trigger.event.direction,
            at = %trigger.event.at,
            wait_secs = trigger.wait.num_seconds(),
            "next shutter event scheduled"
        );

        if !shutdown.sleep(to_std_duration(trigger.wait)).await {
            return Ok(CycleEnd::Cancelled);
        }

        let outcome = self.actuator.actuate(trigger.event.direction, shutdown).await;
        if matches!(outcome, ActuationOutcome::Cancelled { .. }) {
            return Ok(CycleEnd::Cancelled);
        }

        if !shutdown.sleep(self.cooldown).await {
            return Ok(CycleEnd::Cancelled);
        }
        Ok(CycleEnd::Fired {
            event: trigger.event,
            outcome,
        })
    }

    /// Pick the next event as seen from `now`.
    ///
    /// # Errors
    ///
    /// Returns an [`AstronomicalError`] when the sun never reaches an anchor
    /// elevation on the dates involved.
    pub async fn compute(&self, now: Timestamp) -> Result<PendingTrigger, AstronomicalError> {
        let date = self.calculator.location().solar_date(now);
        let today = self.adjusted_events(date).await?;

        let event = match next_event_today(now, &today) {
            Some(event) => event,
            None => {
                let tomorrow = date
                    .succ_opt()
                    .ok_or(AstronomicalError::DateOutOfRange(date))?;
                let raw = self.calculator.compute_raw_events(tomorrow)?;
                let open = self.adjuster.adjust(raw.open, Direction::Open).await;
                tracing::info!(
                    date = %tomorrow,
                    raw_open = %raw.open,
                    open = %open.time,
                    "day is over, scheduling tomorrow's open"
                );
                SolarEvent::open(open.time)
            }
        };
        Ok(PendingTrigger::new(event, now))
    }

    async fn adjusted_events(&self, date: NaiveDate) -> Result<DayEvents, AstronomicalError> {
        let raw = self.calculator.compute_raw_events(date)?;
        let open = self.adjuster.adjust(raw.open, Direction::Open).await;
        let close = self.adjuster.adjust(raw.close, Direction::Close).await;
        tracing::info!(
            %date,
            raw_open = %raw.open,
            raw_close = %raw.close,
            open = %open.time,
            close = %close.time,
            "computed solar events"
        );
        Ok(DayEvents {
            open: open.time,
            close: close.time,
        })
    }
}

/// Time left until the next UTC midnight.
fn until_next_midnight(now: Timestamp) -> Duration {
    let next = now
        .date_naive()
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc() - now)
        .unwrap_or(TimeDelta::days(1));
    to_std_duration(next)
}
