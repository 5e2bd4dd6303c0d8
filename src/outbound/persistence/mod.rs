//! SQLite persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by SQLite
//! via Diesel, with `r2d2` connection pooling and embedded migrations.
//!
//! # Architecture
//!
//! - **Thin adapters**: repository implementations only translate between
//!   Diesel rows and domain types. No business logic resides here.
//! - **Internal models**: row structs (`models.rs`) and schema definitions
//!   (`schema.rs`) are implementation details, never exposed to the domain.
//! - **Constraints as the signal**: the unique indexes declared by the
//!   migrations are the authoritative source of conflict errors; adapters
//!   map `UniqueViolation` to the matching port error variant.
//! - **Strongly typed errors**: all database errors are mapped to domain
//!   persistence error types.

mod diesel_departure_repository;
mod diesel_error_mapping;
mod diesel_ticket_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_departure_repository::DieselDepartureRepository;
pub use diesel_ticket_repository::DieselTicketRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
