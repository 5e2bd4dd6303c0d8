//! Port abstraction for ticket persistence adapters and their errors.

use chrono::NaiveDate;

use crate::domain::departure::{Departure, DepartureId};
use crate::domain::ticket::{Ticket, TicketId};
use crate::domain::user::{User, UserId};

/// Persistence errors raised by ticket repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketPersistenceError {
    /// The user already holds an active ticket for this travel day.
    ///
    /// Raised by the partial unique index; the authoritative signal when two
    /// reservations race past the engine's pre-check.
    #[error("user already holds an active ticket for this day")]
    DuplicateActiveTicket,

    /// No ticket exists with the given id.
    #[error("ticket {ticket_id} not found")]
    NotFound { ticket_id: TicketId },

    /// Repository connection could not be established.
    #[error("ticket repository connection failed: {message}")]
    Connection { message: String },

    /// Query or mutation failed during execution.
    #[error("ticket repository query failed: {message}")]
    Query { message: String },
}

impl TicketPersistenceError {
    /// Create a not-found error for the given ticket id.
    pub fn not_found(ticket_id: TicketId) -> Self {
        Self::NotFound { ticket_id }
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

/// Insert payload for a newly issued ticket.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub departure_id: DepartureId,
    pub user_id: UserId,
    /// Calendar day of the departure, denormalised so the daily-uniqueness
    /// invariant can live in the schema.
    pub travel_day: NaiveDate,
}

pub trait TicketRepository: Send + Sync {
    /// The user's active ticket whose departure falls on `day`, if any.
    ///
    /// Joins through departures and filters on `active` and the day's date
    /// range rather than assuming the uniqueness invariant holds.
    fn find_active_for_user_on(
        &self,
        user_id: UserId,
        day: NaiveDate,
    ) -> Result<Option<(Ticket, Departure)>, TicketPersistenceError>;

    /// Insert an active ticket.
    ///
    /// Does not itself decide the one-ticket-per-day rule; that check
    /// belongs to the booking engine. The partial unique index still rejects
    /// a conflicting insert with
    /// [`TicketPersistenceError::DuplicateActiveTicket`].
    fn insert(&self, new_ticket: NewTicket) -> Result<Ticket, TicketPersistenceError>;

    /// Set `active = false` and return the updated ticket.
    fn revoke(&self, ticket_id: TicketId) -> Result<Ticket, TicketPersistenceError>;

    /// Active tickets on a departure joined with their holders, in ticket
    /// creation order. Used to render passenger lists.
    fn list_active_for_departure(
        &self,
        departure_id: DepartureId,
    ) -> Result<Vec<(Ticket, User)>, TicketPersistenceError>;
}
