//! # shutterhub-domain
//!
//! Pure domain model for the shutterhub shutter scheduler.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps, geographic [`location::Location`]
//! - Define the shutter [`direction::Direction`] and the [`direction::SolarEvent`] it is bound to
//! - Compute raw open/close times from the sun's position ([`solar`])
//! - Decompose fractional-hour offsets into hours and minutes ([`offset`])
//! - Select the forecast sample nearest to a target time and turn its cloud
//!   cover into a signed time shift ([`forecast`])
//! - Classify the shutter controller's plain-text replies ([`reply`])
//! - Decide which event fires next for a given instant ([`schedule`])
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod direction;
pub mod forecast;
pub mod location;
pub mod offset;
pub mod reply;
pub mod schedule;
pub mod solar;
