//! Diesel row structs internal to the persistence adapters.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::departure::{Departure, DepartureId, Station};
use crate::domain::ticket::{Ticket, TicketId};
use crate::domain::user::{DisplayName, ExternalUserId, User, UserId};

use super::schema::{departures, tickets, users};

#[derive(Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRow {
    pub id: i64,
    pub external_id: String,
    pub display_name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub external_id: &'a str,
    pub display_name: &'a str,
}

#[derive(Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = departures)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DepartureRow {
    pub id: i64,
    pub when_local: NaiveDateTime,
    pub station: String,
    pub owner_user_id: i64,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = departures)]
pub struct NewDepartureRow<'a> {
    pub when_local: NaiveDateTime,
    pub station: &'a str,
    pub owner_user_id: i64,
}

#[derive(Debug, Queryable, Selectable, Identifiable)]
#[diesel(table_name = tickets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TicketRow {
    pub id: i64,
    pub departure_id: i64,
    pub user_id: i64,
    pub travel_day: NaiveDate,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tickets)]
pub struct NewTicketRow {
    pub departure_id: i64,
    pub user_id: i64,
    pub travel_day: NaiveDate,
}

/// Raised when a stored row no longer satisfies domain validation.
#[derive(Debug, thiserror::Error)]
#[error("invalid {entity} row {id}: {message}")]
pub struct RowConversionError {
    pub entity: &'static str,
    pub id: i64,
    pub message: String,
}

pub fn user_from_row(row: UserRow) -> Result<User, RowConversionError> {
    let external_id =
        ExternalUserId::new(row.external_id).map_err(|err| RowConversionError {
            entity: "user",
            id: row.id,
            message: err.to_string(),
        })?;
    let display_name = DisplayName::new(row.display_name).map_err(|err| RowConversionError {
        entity: "user",
        id: row.id,
        message: err.to_string(),
    })?;
    Ok(User::new(UserId::new(row.id), external_id, display_name))
}

pub fn departure_from_row(row: DepartureRow) -> Result<Departure, RowConversionError> {
    let station = Station::new(row.station).map_err(|err| RowConversionError {
        entity: "departure",
        id: row.id,
        message: err.to_string(),
    })?;
    Ok(Departure::new(
        DepartureId::new(row.id),
        row.when_local,
        station,
        UserId::new(row.owner_user_id),
        row.active,
    ))
}

pub fn ticket_from_row(row: TicketRow) -> Ticket {
    Ticket::new(
        TicketId::new(row.id),
        DepartureId::new(row.departure_id),
        UserId::new(row.user_id),
        row.travel_day,
        row.active,
    )
}
