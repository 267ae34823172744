//! # shutterhub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ForecastProvider` — fetch a cloud-cover forecast for a location
//!   - `ShutterDevice` — send a move command to the shutter controller
//!   - `Clock` — the current instant
//! - Define the use-case services:
//!   - `ForecastAdjuster` — shift a raw solar time by forecast cloud cover
//!   - `ActuationService` — send a command and retry while the device is busy
//!   - `TriggerScheduler` — the compute → wait → fire loop
//! - Provide **in-process infrastructure** that doesn't need IO
//!   (`Shutdown` signal, `NoForecast` provider)
//!
//! ## Dependency rule
//! Depends on `shutterhub-domain` only (plus `tokio` for timers and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod no_forecast;
pub mod ports;
pub mod services;
pub mod shutdown;
