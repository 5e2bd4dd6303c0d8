//! Domain ports for the hexagonal boundary.
//!
//! The booking engine only ever talks to these traits; the Diesel adapters
//! in [`crate::outbound::persistence`] implement them against SQLite.

mod departure_repository;
mod ticket_repository;
mod user_repository;

pub use departure_repository::{DeparturePersistenceError, DepartureRepository, NewDeparture};
pub use ticket_repository::{NewTicket, TicketPersistenceError, TicketRepository};
pub use user_repository::{NewUser, UserPersistenceError, UserRepository};
