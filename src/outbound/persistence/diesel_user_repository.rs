//! SQLite-backed `UserRepository` implementation using Diesel ORM.

use diesel::prelude::*;
use tracing::debug;

use crate::domain::ports::{NewUser, UserPersistenceError, UserRepository};
use crate::domain::user::{ExternalUserId, User};

use super::diesel_error_mapping::{
    map_basic_diesel_error, map_conflict_diesel_error, map_pool_error,
};
use super::models::{NewUserRow, UserRow, user_from_row};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn map_row_error(error: super::models::RowConversionError) -> UserPersistenceError {
    UserPersistenceError::query(error.to_string())
}

impl UserRepository for DieselUserRepository {
    fn find_by_external_id(
        &self,
        external_id: &ExternalUserId,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        let row: Option<UserRow> = users::table
            .filter(users::external_id.eq(external_id.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(map_error)?;

        row.map(|row| user_from_row(row).map_err(map_row_error))
            .transpose()
    }

    fn insert(&self, new_user: NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|err| map_pool_error(err, UserPersistenceError::connection))?;

        let row = NewUserRow {
            external_id: new_user.external_id.as_ref(),
            display_name: new_user.display_name.as_ref(),
        };
        let inserted: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .map_err(|error| {
                map_conflict_diesel_error(
                    error,
                    || UserPersistenceError::duplicate_external_id(new_user.external_id.as_ref()),
                    UserPersistenceError::query,
                    UserPersistenceError::connection,
                )
            })?;
        debug!(user_id = inserted.id, "user row inserted");

        user_from_row(inserted).map_err(map_row_error)
    }
}
