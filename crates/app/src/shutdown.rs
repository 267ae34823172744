//! Shutdown signal — lets the scheduler stop cleanly between steps.
//!
//! Backed by a tokio [`watch`] channel so any number of waiters observe the
//! same flag. Waiting is interrupted as soon as the flag is raised.

use std::time::Duration;

use tokio::sync::watch;

/// Raises the shutdown flag.
#[derive(Debug)]
pub struct ShutdownHandle {
    sender: watch::Sender<bool>,
}

impl ShutdownHandle {
    /// Raise the flag. Idempotent.
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }
}

/// Observes the shutdown flag.
#[derive(Debug, Clone)]
pub struct Shutdown {
    receiver: watch::Receiver<bool>,
}

/// Create a connected handle/signal pair.
#[must_use]
pub fn channel() -> (ShutdownHandle, Shutdown) {
    let (sender, receiver) = watch::channel(false);
    (ShutdownHandle { sender }, Shutdown { receiver })
}

impl Shutdown {
    /// A signal that is never raised.
    #[must_use]
    pub fn never() -> Self {
        let (_, signal) = channel();
        signal
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once the flag is raised. Never resolves if the handle was
    /// dropped without triggering.
    pub async fn triggered(&self) {
        let mut receiver = self.receiver.clone();
        if receiver.wait_for(|raised| *raised).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Sleep for `duration` unless shutdown is requested first.
    ///
    /// Returns `true` when the full duration elapsed, `false` when it was
    /// interrupted (or the flag was already raised).
    pub async fn sleep(&self, duration: Duration) -> bool {
        if self.is_triggered() {
            return false;
        }
        tokio::select! {
            () = tokio::time::sleep(duration) => true,
            () = self.triggered() => false,
        }
    }
}
