//! Shutter device port — the controller that physically moves the shutters.

use std::future::Future;

use shutterhub_domain::direction::Direction;

/// Failures that are not transient-busy replies. None of them is retried.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("shutter request failed")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The controller answered with a non-success status.
    #[error("shutter controller returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Sends one move command per call.
pub trait ShutterDevice {
    /// Send `direction` and return the plain-text body of a success response.
    fn send(
        &self,
        direction: Direction,
    ) -> impl Future<Output = Result<String, DeviceError>> + Send;
}

impl<T: ShutterDevice + Send + Sync> ShutterDevice for std::sync::Arc<T> {
    fn send(
        &self,
        direction: Direction,
    ) -> impl Future<Output = Result<String, DeviceError>> + Send {
        (**self).send(direction)
    }
}
