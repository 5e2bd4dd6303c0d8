//! Domain entities, policies, ports, and the booking engine.
//!
//! Types here are transport agnostic and immutable once constructed; the
//! persistence adapters in [`crate::outbound`] implement the repository
//! ports, and front ends drive [`BookingService`] directly.

pub mod booking_service;
pub mod departure;
pub mod error;
pub mod ports;
pub mod schedule;
pub mod ticket;
pub mod user;
pub mod window;

pub use self::booking_service::{BookingService, DepartureProposal, Reservation, RevokedTicket};
pub use self::departure::{Departure, DepartureId, Station, StationValidationError};
pub use self::error::{BookingError, PolicyError};
pub use self::schedule::ScheduleRow;
pub use self::ticket::{Ticket, TicketId};
pub use self::user::{DisplayName, ExternalUserId, User, UserId, UserValidationError};
pub use self::window::{BookingWindow, WindowBound};
