//! Port abstraction for departure persistence adapters and their errors.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::departure::{Departure, Station};
use crate::domain::user::UserId;

/// Persistence errors raised by departure repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeparturePersistenceError {
    /// A departure already occupies this `(when_local, station)` slot,
    /// active or not.
    #[error("departure slot {when_local} / {station} is already taken")]
    DuplicateSlot {
        when_local: NaiveDateTime,
        station: Station,
    },

    /// Repository connection could not be established.
    #[error("departure repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("departure repository query failed: {message}")]
    Query { message: String },
}

impl DeparturePersistenceError {
    /// Create a duplicate-slot error for the given slot.
    pub fn duplicate_slot(when_local: NaiveDateTime, station: Station) -> Self {
        Self::DuplicateSlot {
            when_local,
            station,
        }
    }

    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Insert payload for a newly proposed departure.
#[derive(Debug, Clone)]
pub struct NewDeparture {
    pub when_local: NaiveDateTime,
    pub station: Station,
    pub owner_user_id: UserId,
}

pub trait DepartureRepository: Send + Sync {
    /// Insert a departure with `active = true`.
    ///
    /// The unique index on `(when_local, station)` is checked atomically at
    /// insert time; a clash surfaces as
    /// [`DeparturePersistenceError::DuplicateSlot`] regardless of the
    /// existing row's `active` state.
    fn insert(&self, new_departure: NewDeparture) -> Result<Departure, DeparturePersistenceError>;

    /// Exact-match slot lookup, ignoring `active` state.
    fn find_by_slot(
        &self,
        when_local: NaiveDateTime,
        station: &Station,
    ) -> Result<Option<Departure>, DeparturePersistenceError>;

    /// All active departures on `day`, ordered by `when_local` ascending.
    ///
    /// Recomputed from storage on every call.
    fn list_active_on(&self, day: NaiveDate) -> Result<Vec<Departure>, DeparturePersistenceError>;
}
