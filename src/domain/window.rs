//! Booking window policy.
//!
//! Pure validation that a proposed departure time falls on the current
//! calendar day and inside the configured daily booking window. The caller
//! supplies "today"; deriving it from the clock and the configured zone is
//! the booking engine's job.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::domain::error::PolicyError;

/// Hour/minute bound of the daily booking window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBound {
    pub hour: u32,
    pub minute: u32,
}

impl WindowBound {
    /// Construct a bound from hour and minute of day.
    pub const fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }
}

/// Daily time-of-day range during which proposals and reservations are
/// permitted.
///
/// The upper bound is inclusive: a candidate at exactly `end` is accepted.
/// The lower bound compares the hour only; `start.minute` is carried for
/// rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BookingWindow {
    pub start: WindowBound,
    pub end: WindowBound,
}

impl Default for BookingWindow {
    fn default() -> Self {
        Self {
            start: WindowBound::new(11, 0),
            end: WindowBound::new(15, 30),
        }
    }
}

impl BookingWindow {
    /// Validate that `candidate` falls on `today` and inside the window.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::OutOfRange`] for a candidate on any other
    /// calendar day and [`PolicyError::OutsideBookingHours`] for one outside
    /// the configured daily range.
    pub fn validate(
        &self,
        candidate: NaiveDateTime,
        today: NaiveDate,
    ) -> Result<NaiveDateTime, PolicyError> {
        if candidate.date() != today {
            return Err(PolicyError::OutOfRange);
        }

        let (hour, minute) = (candidate.hour(), candidate.minute());
        if hour < self.start.hour {
            return Err(PolicyError::OutsideBookingHours);
        }
        let within_end =
            hour < self.end.hour || (hour == self.end.hour && minute <= self.end.minute);
        if !within_end {
            return Err(PolicyError::OutsideBookingHours);
        }

        Ok(candidate)
    }
}
