//! Diesel table definitions for the SQLite schema.
//!
//! These definitions must match the migrations exactly. They are used by
//! Diesel for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Registered users, created lazily on first contact.
    users (id) {
        /// Primary key (SQLite rowid).
        id -> BigInt,
        /// Stable external handle, unique.
        external_id -> Text,
        /// Human-readable display name.
        display_name -> Text,
        /// Record creation timestamp.
        created_at -> Timestamp,
    }
}

diesel::table! {
    /// Proposed meetup slots for a calendar day.
    ///
    /// `(when_local, station)` carries a unique index spanning active and
    /// inactive rows.
    departures (id) {
        /// Primary key (SQLite rowid).
        id -> BigInt,
        /// Departure time in the configured local zone.
        when_local -> Timestamp,
        /// Free-text station label.
        station -> Text,
        /// Proposing user, for attribution only.
        owner_user_id -> BigInt,
        /// Soft-revocation flag; stays true in the current scope.
        active -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamp,
    }
}

diesel::table! {
    /// Seat reservations against departures.
    ///
    /// `(user_id, travel_day)` carries a partial unique index over active
    /// rows, enforcing one active ticket per user per day.
    tickets (id) {
        /// Primary key (SQLite rowid).
        id -> BigInt,
        /// Departure the seat is reserved on.
        departure_id -> BigInt,
        /// User holding the reservation.
        user_id -> BigInt,
        /// Calendar day of the departure, denormalised at issue time.
        travel_day -> Date,
        /// Cleared on revocation; rows are never deleted.
        active -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamp,
    }
}

diesel::joinable!(departures -> users (owner_user_id));
diesel::joinable!(tickets -> departures (departure_id));
diesel::joinable!(tickets -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, departures, tickets);
