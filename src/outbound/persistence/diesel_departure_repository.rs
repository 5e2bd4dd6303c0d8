//! SQLite-backed `DepartureRepository` implementation using Diesel ORM.
//!
//! Slot uniqueness is enforced by the `departures_slot_key` index; the
//! insert path treats its violation as the `DuplicateSlot` signal rather
//! than pre-checking.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use diesel::prelude::*;
use tracing::debug;

use crate::domain::departure::{Departure, Station};
use crate::domain::ports::{DeparturePersistenceError, DepartureRepository, NewDeparture};

use super::diesel_error_mapping::{
    map_basic_diesel_error, map_conflict_diesel_error, map_pool_error,
};
use super::models::{DepartureRow, NewDepartureRow, departure_from_row};
use super::pool::DbPool;
use super::schema::departures;

/// Diesel-backed implementation of the `DepartureRepository` port.
#[derive(Clone)]
pub struct DieselDepartureRepository {
    pool: DbPool,
}

impl DieselDepartureRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> DeparturePersistenceError {
    map_basic_diesel_error(
        error,
        DeparturePersistenceError::query,
        DeparturePersistenceError::connection,
    )
}

fn map_row_error(error: super::models::RowConversionError) -> DeparturePersistenceError {
    DeparturePersistenceError::query(error.to_string())
}

/// Half-open datetime range covering one calendar day.
pub(super) fn day_bounds(day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = day.and_time(NaiveTime::MIN);
    (start, start + TimeDelta::days(1))
}

impl DepartureRepository for DieselDepartureRepository {
    fn insert(
        &self,
        new_departure: NewDeparture,
    ) -> Result<Departure, DeparturePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|err| map_pool_error(err, DeparturePersistenceError::connection))?;

        let row = NewDepartureRow {
            when_local: new_departure.when_local,
            station: new_departure.station.as_ref(),
            owner_user_id: new_departure.owner_user_id.value(),
        };
        let inserted: DepartureRow = diesel::insert_into(departures::table)
            .values(&row)
            .returning(DepartureRow::as_returning())
            .get_result(&mut conn)
            .map_err(|error| {
                map_conflict_diesel_error(
                    error,
                    || {
                        DeparturePersistenceError::duplicate_slot(
                            new_departure.when_local,
                            new_departure.station.clone(),
                        )
                    },
                    DeparturePersistenceError::query,
                    DeparturePersistenceError::connection,
                )
            })?;
        debug!(departure_id = inserted.id, "departure row inserted");

        departure_from_row(inserted).map_err(map_row_error)
    }

    fn find_by_slot(
        &self,
        when_local: NaiveDateTime,
        station: &Station,
    ) -> Result<Option<Departure>, DeparturePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|err| map_pool_error(err, DeparturePersistenceError::connection))?;

        // No active filter: duplicate checks must see inactive rows too.
        let row: Option<DepartureRow> = departures::table
            .filter(departures::when_local.eq(when_local))
            .filter(departures::station.eq(station.as_ref()))
            .select(DepartureRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(map_error)?;

        row.map(|row| departure_from_row(row).map_err(map_row_error))
            .transpose()
    }

    fn list_active_on(
        &self,
        day: NaiveDate,
    ) -> Result<Vec<Departure>, DeparturePersistenceError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|err| map_pool_error(err, DeparturePersistenceError::connection))?;

        let (start, end) = day_bounds(day);
        let rows: Vec<DepartureRow> = departures::table
            .filter(departures::active.eq(true))
            .filter(departures::when_local.ge(start))
            .filter(departures::when_local.lt(end))
            .order(departures::when_local.asc())
            .select(DepartureRow::as_select())
            .load(&mut conn)
            .map_err(map_error)?;

        rows.into_iter()
            .map(|row| departure_from_row(row).map_err(map_row_error))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{NewUser, UserRepository};
    use crate::domain::user::{DisplayName, ExternalUserId, UserId};
    use crate::outbound::persistence::DieselUserRepository;
    use crate::test_support::in_memory_pool;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        day().and_hms_opt(hour, minute, 0).unwrap()
    }

    fn seed_owner(pool: &DbPool) -> UserId {
        let users = DieselUserRepository::new(pool.clone());
        users
            .insert(NewUser {
                external_id: ExternalUserId::new("owner").unwrap(),
                display_name: DisplayName::new("Owner").unwrap(),
            })
            .unwrap()
            .id()
    }

    fn new_departure(when_local: NaiveDateTime, station: &str, owner: UserId) -> NewDeparture {
        NewDeparture {
            when_local,
            station: Station::new(station).unwrap(),
            owner_user_id: owner,
        }
    }

    #[rstest]
    fn insert_then_find_by_slot_round_trips() {
        let pool = in_memory_pool();
        let owner = seed_owner(&pool);
        let repo = DieselDepartureRepository::new(pool);

        let inserted = repo
            .insert(new_departure(at(12, 0), "Central", owner))
            .unwrap();
        let found = repo
            .find_by_slot(at(12, 0), &Station::new("Central").unwrap())
            .unwrap()
            .expect("departure present");

        assert_eq!(found, inserted);
        assert!(found.active());
    }

    #[rstest]
    fn duplicate_slot_is_rejected_by_the_index() {
        let pool = in_memory_pool();
        let owner = seed_owner(&pool);
        let repo = DieselDepartureRepository::new(pool);
        repo.insert(new_departure(at(12, 0), "Central", owner))
            .unwrap();

        let err = repo
            .insert(new_departure(at(12, 0), "Central", owner))
            .unwrap_err();

        assert!(matches!(
            err,
            DeparturePersistenceError::DuplicateSlot { .. }
        ));
    }

    #[rstest]
    fn same_time_different_station_is_allowed() {
        let pool = in_memory_pool();
        let owner = seed_owner(&pool);
        let repo = DieselDepartureRepository::new(pool);
        repo.insert(new_departure(at(12, 0), "Central", owner))
            .unwrap();

        assert!(repo.insert(new_departure(at(12, 0), "East", owner)).is_ok());
    }

    #[rstest]
    fn list_active_on_is_ordered_and_bounded_to_the_day() {
        let pool = in_memory_pool();
        let owner = seed_owner(&pool);
        let repo = DieselDepartureRepository::new(pool);
        repo.insert(new_departure(at(13, 15), "East", owner)).unwrap();
        repo.insert(new_departure(at(11, 30), "Central", owner))
            .unwrap();
        let tomorrow_noon = day().succ_opt().unwrap().and_hms_opt(12, 0, 0).unwrap();
        repo.insert(new_departure(tomorrow_noon, "Central", owner))
            .unwrap();

        let listed = repo.list_active_on(day()).unwrap();

        let slots: Vec<NaiveDateTime> = listed.iter().map(Departure::when_local).collect();
        assert_eq!(slots, vec![at(11, 30), at(13, 15)]);
    }
}
