//! SQLite-backed `TicketRepository` implementation using Diesel ORM.
//!
//! The one-active-ticket-per-user-per-day invariant is enforced by the
//! partial unique index `tickets_one_active_per_user_day`; the insert path
//! treats its violation as the `DuplicateActiveTicket` signal.

use chrono::NaiveDate;
use diesel::prelude::*;
use tracing::debug;

use crate::domain::departure::{Departure, DepartureId};
use crate::domain::ports::{NewTicket, TicketPersistenceError, TicketRepository};
use crate::domain::ticket::{Ticket, TicketId};
use crate::domain::user::{User, UserId};

use super::diesel_departure_repository::day_bounds;
use super::diesel_error_mapping::{
    map_basic_diesel_error, map_conflict_diesel_error, map_pool_error,
};
use super::models::{
    DepartureRow, NewTicketRow, TicketRow, UserRow, departure_from_row, ticket_from_row,
    user_from_row,
};
use super::pool::DbPool;
use super::schema::{departures, tickets, users};

/// Diesel-backed implementation of the `TicketRepository` port.
#[derive(Clone)]
pub struct DieselTicketRepository {
    pool: DbPool,
}

impl DieselTicketRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> TicketPersistenceError {
    map_basic_diesel_error(
        error,
        TicketPersistenceError::query,
        TicketPersistenceError::connection,
    )
}

fn map_row_error(error: super::models::RowConversionError) -> TicketPersistenceError {
    TicketPersistenceError::query(error.to_string())
}

impl TicketRepository for DieselTicketRepository {
    fn find_active_for_user_on(
        &self,
        user_id: UserId,
        day: NaiveDate,
    ) -> Result<Option<(Ticket, Departure)>, TicketPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|err| map_pool_error(err, TicketPersistenceError::connection))?;

        // Joined through departures with explicit active and date-range
        // filters; the uniqueness invariant is not assumed here.
        let (start, end) = day_bounds(day);
        let row: Option<(TicketRow, DepartureRow)> = tickets::table
            .inner_join(departures::table)
            .filter(tickets::user_id.eq(user_id.value()))
            .filter(tickets::active.eq(true))
            .filter(departures::when_local.ge(start))
            .filter(departures::when_local.lt(end))
            .select((TicketRow::as_select(), DepartureRow::as_select()))
            .first(&mut conn)
            .optional()
            .map_err(map_error)?;

        row.map(|(ticket_row, departure_row)| {
            let departure = departure_from_row(departure_row).map_err(map_row_error)?;
            Ok((ticket_from_row(ticket_row), departure))
        })
        .transpose()
    }

    fn insert(&self, new_ticket: NewTicket) -> Result<Ticket, TicketPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|err| map_pool_error(err, TicketPersistenceError::connection))?;

        let row = NewTicketRow {
            departure_id: new_ticket.departure_id.value(),
            user_id: new_ticket.user_id.value(),
            travel_day: new_ticket.travel_day,
        };
        let inserted: TicketRow = diesel::insert_into(tickets::table)
            .values(&row)
            .returning(TicketRow::as_returning())
            .get_result(&mut conn)
            .map_err(|error| {
                map_conflict_diesel_error(
                    error,
                    || TicketPersistenceError::DuplicateActiveTicket,
                    TicketPersistenceError::query,
                    TicketPersistenceError::connection,
                )
            })?;
        debug!(ticket_id = inserted.id, "ticket row inserted");

        Ok(ticket_from_row(inserted))
    }

    fn revoke(&self, ticket_id: TicketId) -> Result<Ticket, TicketPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|err| map_pool_error(err, TicketPersistenceError::connection))?;

        let updated: Option<TicketRow> = diesel::update(tickets::table.find(ticket_id.value()))
            .set(tickets::active.eq(false))
            .returning(TicketRow::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(map_error)?;

        updated
            .map(ticket_from_row)
            .ok_or_else(|| TicketPersistenceError::not_found(ticket_id))
    }

    fn list_active_for_departure(
        &self,
        departure_id: DepartureId,
    ) -> Result<Vec<(Ticket, User)>, TicketPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|err| map_pool_error(err, TicketPersistenceError::connection))?;

        let rows: Vec<(TicketRow, UserRow)> = tickets::table
            .inner_join(users::table)
            .filter(tickets::departure_id.eq(departure_id.value()))
            .filter(tickets::active.eq(true))
            .order(tickets::id.asc())
            .select((TicketRow::as_select(), UserRow::as_select()))
            .load(&mut conn)
            .map_err(map_error)?;

        rows.into_iter()
            .map(|(ticket_row, user_row)| {
                let user = user_from_row(user_row).map_err(map_row_error)?;
                Ok((ticket_from_row(ticket_row), user))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::departure::Station;
    use crate::domain::ports::{DepartureRepository, NewDeparture, NewUser, UserRepository};
    use crate::domain::user::{DisplayName, ExternalUserId};
    use crate::outbound::persistence::{DieselDepartureRepository, DieselUserRepository};
    use crate::test_support::in_memory_pool;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    struct Seeded {
        tickets: DieselTicketRepository,
        user: User,
        departure: Departure,
    }

    fn seeded() -> Seeded {
        let pool = in_memory_pool();
        let users = DieselUserRepository::new(pool.clone());
        let departures = DieselDepartureRepository::new(pool.clone());

        let user = users
            .insert(NewUser {
                external_id: ExternalUserId::new("4711").unwrap(),
                display_name: DisplayName::new("Ada Lovelace").unwrap(),
            })
            .unwrap();
        let departure = departures
            .insert(NewDeparture {
                when_local: day().and_hms_opt(12, 0, 0).unwrap(),
                station: Station::new("Central").unwrap(),
                owner_user_id: user.id(),
            })
            .unwrap();

        Seeded {
            tickets: DieselTicketRepository::new(pool),
            user,
            departure,
        }
    }

    fn new_ticket(seeded: &Seeded) -> NewTicket {
        NewTicket {
            departure_id: seeded.departure.id(),
            user_id: seeded.user.id(),
            travel_day: seeded.departure.travel_day(),
        }
    }

    #[rstest]
    fn insert_then_find_active_round_trips() {
        let fx = seeded();

        let inserted = fx.tickets.insert(new_ticket(&fx)).unwrap();
        let (found, departure) = fx
            .tickets
            .find_active_for_user_on(fx.user.id(), day())
            .unwrap()
            .expect("ticket present");

        assert_eq!(found, inserted);
        assert_eq!(departure, fx.departure);
    }

    #[rstest]
    fn second_active_ticket_same_day_is_rejected_by_the_partial_index() {
        let fx = seeded();
        fx.tickets.insert(new_ticket(&fx)).unwrap();

        let err = fx.tickets.insert(new_ticket(&fx)).unwrap_err();

        assert_eq!(err, TicketPersistenceError::DuplicateActiveTicket);
    }

    #[rstest]
    fn revoked_ticket_frees_the_partial_index_slot() {
        let fx = seeded();
        let first = fx.tickets.insert(new_ticket(&fx)).unwrap();

        let revoked = fx.tickets.revoke(first.id()).unwrap();
        assert!(!revoked.active());

        // The revoked row stays, a fresh active ticket is accepted.
        let second = fx.tickets.insert(new_ticket(&fx)).unwrap();
        assert_ne!(second.id(), first.id());
    }

    #[rstest]
    fn revoke_unknown_ticket_reports_not_found() {
        let fx = seeded();

        let err = fx.tickets.revoke(TicketId::new(999)).unwrap_err();

        assert_eq!(
            err,
            TicketPersistenceError::not_found(TicketId::new(999))
        );
    }

    #[rstest]
    fn find_active_ignores_other_days() {
        let fx = seeded();
        fx.tickets.insert(new_ticket(&fx)).unwrap();

        let found = fx
            .tickets
            .find_active_for_user_on(fx.user.id(), day().succ_opt().unwrap())
            .unwrap();

        assert!(found.is_none());
    }

    #[rstest]
    fn passenger_list_preserves_ticket_creation_order() {
        let pool = in_memory_pool();
        let users = DieselUserRepository::new(pool.clone());
        let departures = DieselDepartureRepository::new(pool.clone());
        let tickets = DieselTicketRepository::new(pool);

        let departure = {
            let owner = users
                .insert(NewUser {
                    external_id: ExternalUserId::new("a").unwrap(),
                    display_name: DisplayName::new("User A").unwrap(),
                })
                .unwrap();
            departures
                .insert(NewDeparture {
                    when_local: day().and_hms_opt(12, 0, 0).unwrap(),
                    station: Station::new("Central").unwrap(),
                    owner_user_id: owner.id(),
                })
                .unwrap()
        };
        for (external_id, display_name) in [("b", "User B"), ("c", "User C"), ("a", "User A")] {
            let user = match users.insert(NewUser {
                external_id: ExternalUserId::new(external_id).unwrap(),
                display_name: DisplayName::new(display_name).unwrap(),
            }) {
                Ok(user) => user,
                Err(_) => users
                    .find_by_external_id(&ExternalUserId::new(external_id).unwrap())
                    .unwrap()
                    .expect("seeded user"),
            };
            tickets
                .insert(NewTicket {
                    departure_id: departure.id(),
                    user_id: user.id(),
                    travel_day: departure.travel_day(),
                })
                .unwrap();
        }

        let listed = tickets.list_active_for_departure(departure.id()).unwrap();

        let names: Vec<&str> = listed
            .iter()
            .map(|(_, user)| user.display_name().as_ref())
            .collect();
        assert_eq!(names, vec!["User B", "User C", "User A"]);
    }
}
