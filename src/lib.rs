//! Booking consistency engine for daily canteen meetup trains.
//!
//! Users propose a departure (time + station) for the current day, other
//! users reserve a seat on exactly one departure per day, and reservations
//! may be revoked to free the seat again. The crate is transport agnostic:
//! chat plumbing, command parsing, and access gating live in the front end,
//! which drives [`domain::BookingService`] directly.

pub mod config;
pub mod domain;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::BookingConfig;
pub use domain::BookingService;
