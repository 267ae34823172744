//! Actuation service — sends a move command and retries while the device is busy.
//!
//! Only the controller's "try again later" reply is treated as transient.
//! Transport failures, error statuses and unrecognized bodies end the
//! attempt immediately. Retry state lives for a single call.

use std::time::Duration;

use shutterhub_domain::direction::Direction;
use shutterhub_domain::reply::DeviceReply;

use crate::ports::{DeviceError, ShutterDevice};
use crate::shutdown::Shutdown;

/// Bounded fixed-delay retry for busy replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Why an actuation ended without moving the shutters.
#[derive(Debug, thiserror::Error)]
pub enum ActuationError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("unexpected reply from shutter controller: {0:?}")]
    UnexpectedBody(String),
}

/// Final result of one [`ActuationService::actuate`] call.
#[derive(Debug)]
pub enum ActuationOutcome {
    Success { attempts: u32 },
    /// Every attempt got a busy reply.
    GivenUp { attempts: u32 },
    Failed { attempts: u32, error: ActuationError },
    /// Shutdown was requested while waiting to retry.
    Cancelled { attempts: u32 },
}

impl ActuationOutcome {
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts }
            | Self::GivenUp { attempts }
            | Self::Failed { attempts, .. }
            | Self::Cancelled { attempts } => *attempts,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Drives a [`ShutterDevice`] with retry on busy replies.
pub struct ActuationService<D> {
    device: D,
    policy: RetryPolicy,
}

impl<D: ShutterDevice> ActuationService<D> {
    /// Create a new service for the given device.
    pub fn new(device: D, policy: RetryPolicy) -> Self {
        Self { device, policy }
    }

    #[cfg(test)]
    pub(crate) fn device(&self) -> &D {
        &self.device
    }

    /// Move the shutters in `direction`.
    ///
    /// Sends exactly one request per attempt and waits
    /// [`RetryPolicy::retry_delay`] between attempts. Never fails: every
    /// error is folded into the returned [`ActuationOutcome`].
    pub async fn actuate(&self, direction: Direction, shutdown: &Shutdown) -> ActuationOutcome {
        let max_attempts = self.policy.max_attempts();
        tracing::info!(%direction, "moving shutters");

        let mut attempt = 0;
        loop {
            attempt += 1;
            tracing::debug!(%direction, attempt, max_attempts, "sending shutter command");

            let body = match self.device.send(direction).await {
                Ok(body) => body,
                Err(err) => {
                    tracing::error!(%direction, attempt, error = %err, "shutter command failed");
                    return ActuationOutcome::Failed {
                        attempts: attempt,
                        error: err.into(),
                    };
                }
            };

            match DeviceReply::from_body(&body) {
                DeviceReply::Success => {
                    tracing::info!(
                        attempts = attempt,
                        "successfully {} shutters",
                        direction.past_tense()
                    );
                    return ActuationOutcome::Success { attempts: attempt };
                }
                DeviceReply::Unrecognized(body) => {
                    tracing::error!(
                        %direction,
                        attempt,
                        body = %body,
                        "unknown reply from shutter controller"
                    );
                    return ActuationOutcome::Failed {
                        attempts: attempt,
                        error: ActuationError::UnexpectedBody(body),
                    };
                }
                DeviceReply::Busy if attempt >= max_attempts => {
                    tracing::warn!(
                        %direction,
                        attempts = attempt,
                        "shutter controller still busy, giving up"
                    );
                    return ActuationOutcome::GivenUp { attempts: attempt };
                }
                DeviceReply::Busy => {
                    tracing::info!(
                        %direction,
                        attempt,
                        retry_in_secs = self.policy.retry_delay.as_secs_f64(),
                        "shutter controller busy, retrying"
                    );
                    if !shutdown.sleep(self.policy.retry_delay).await {
                        tracing::info!(
                            %direction,
                            attempts = attempt,
                            "retry cancelled by shutdown"
                        );
                        return ActuationOutcome::Cancelled { attempts: attempt };
                    }
                }
            }
        }
    }
}
