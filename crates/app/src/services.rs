//! Application services — use-cases built on top of the ports.

pub mod actuation_service;
pub mod forecast_adjuster;
pub mod trigger_scheduler;
