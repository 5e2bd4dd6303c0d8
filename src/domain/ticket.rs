//! Ticket data model.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::departure::DepartureId;
use crate::domain::user::UserId;

/// Storage-generated ticket identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(i64);

impl TicketId {
    /// Wrap a storage-generated identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Access the raw identifier value.
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user's reservation against one departure.
///
/// ## Invariants
/// - Per user, at most one ticket with `active = true` whose departure falls
///   on a given calendar day; the storage layer enforces this with a partial
///   unique index over `(user_id, travel_day)`.
///
/// `travel_day` is copied from the departure at issue time so that invariant
/// can live in the schema. Tickets are never physically deleted; revocation
/// clears `active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    id: TicketId,
    departure_id: DepartureId,
    user_id: UserId,
    travel_day: NaiveDate,
    active: bool,
}

impl Ticket {
    /// Build a [`Ticket`] from validated components.
    pub fn new(
        id: TicketId,
        departure_id: DepartureId,
        user_id: UserId,
        travel_day: NaiveDate,
        active: bool,
    ) -> Self {
        Self {
            id,
            departure_id,
            user_id,
            travel_day,
            active,
        }
    }

    /// Storage identifier.
    pub fn id(&self) -> TicketId {
        self.id
    }

    /// Departure the seat is reserved on.
    pub fn departure_id(&self) -> DepartureId {
        self.departure_id
    }

    /// User holding the reservation.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Calendar day of the departure, denormalised at issue time.
    pub fn travel_day(&self) -> NaiveDate {
        self.travel_day
    }

    /// Whether the reservation is still active.
    pub fn active(&self) -> bool {
        self.active
    }
}
