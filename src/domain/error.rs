//! Booking error taxonomy.
//!
//! Transport agnostic: front ends render these directly as user-facing
//! replies. None of them are retried by the engine, except the identity
//! first-contact race which retries its lookup once internally.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::domain::departure::Station;

/// Failures of the clock/window policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The proposed time falls on a different calendar day.
    #[error("schedule planning is only supported for the current day")]
    OutOfRange,
    /// The proposed time falls outside the configured booking window.
    #[error("the proposed time falls outside the daily booking window")]
    OutsideBookingHours,
    /// A free-text time could not be parsed.
    ///
    /// Emitted by front ends whose parsing fails before the engine is
    /// invoked; the policy itself never constructs it.
    #[error("the provided time could not be parsed")]
    UnparseableTime,
}

/// Errors returned by the booking engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error(transparent)]
    Policy(#[from] PolicyError),
    /// A departure already occupies this `(time, station)` slot.
    #[error("a departure at {when_local} from {station} already exists")]
    DuplicateDeparture {
        when_local: NaiveDateTime,
        station: Station,
    },
    /// The user already holds an active ticket for today.
    #[error("already registered for a train today")]
    AlreadyBooked,
    /// No departure matches the requested slot.
    #[error("no departure at {when_local} from {station}")]
    NoSuchDeparture {
        when_local: NaiveDateTime,
        station: Station,
    },
    /// The user holds no active ticket to revoke.
    #[error("no ticket available to revoke")]
    NoActiveTicket,
    /// The referenced ticket does not exist.
    #[error("ticket not found")]
    TicketNotFound,
    /// The backing store failed; the request aborts with no partial state.
    #[error("storage failure: {message}")]
    Storage { message: String },
}

impl BookingError {
    /// Create a storage error with the given message.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
