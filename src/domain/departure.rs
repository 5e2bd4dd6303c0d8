//! Departure data model.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::user::UserId;

/// Validation errors returned by [`Station::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StationValidationError {
    #[error("station name must not be empty")]
    Empty,
    #[error("station name must be at most {max} characters")]
    TooLong { max: usize },
}

/// Maximum allowed length for a station label.
pub const STATION_MAX: usize = 50;

/// Storage-generated departure identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepartureId(i64);

impl DepartureId {
    /// Wrap a storage-generated identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Access the raw identifier value.
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DepartureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-text station label identifying where the train departs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Station(String);

impl Station {
    /// Validate and construct a [`Station`].
    pub fn new(station: impl Into<String>) -> Result<Self, StationValidationError> {
        Self::from_owned(station.into())
    }

    fn from_owned(station: String) -> Result<Self, StationValidationError> {
        if station.trim().is_empty() {
            return Err(StationValidationError::Empty);
        }
        if station.chars().count() > STATION_MAX {
            return Err(StationValidationError::TooLong { max: STATION_MAX });
        }
        Ok(Self(station))
    }
}

impl AsRef<str> for Station {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Station> for String {
    fn from(value: Station) -> Self {
        value.0
    }
}

impl TryFrom<String> for Station {
    type Error = StationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// A proposed meetup slot (time + station) for the current day.
///
/// ## Invariants
/// - `(when_local, station)` is unique among all departures, active or not;
///   the storage layer enforces this with a unique index.
/// - `when_local` fell on the current calendar day when the departure was
///   created.
///
/// Ownership is attribution only: anyone may reserve a seat regardless of
/// `owner_user_id`. Departures are never physically deleted; `active` exists
/// for soft revocation but no operation clears it in the current scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Departure {
    id: DepartureId,
    when_local: NaiveDateTime,
    station: Station,
    owner_user_id: UserId,
    active: bool,
}

impl Departure {
    /// Build a [`Departure`] from validated components.
    pub fn new(
        id: DepartureId,
        when_local: NaiveDateTime,
        station: Station,
        owner_user_id: UserId,
        active: bool,
    ) -> Self {
        Self {
            id,
            when_local,
            station,
            owner_user_id,
            active,
        }
    }

    /// Storage identifier.
    pub fn id(&self) -> DepartureId {
        self.id
    }

    /// Departure time in the configured local zone.
    pub fn when_local(&self) -> NaiveDateTime {
        self.when_local
    }

    /// Station the train departs from.
    pub fn station(&self) -> &Station {
        &self.station
    }

    /// Proposing user, for attribution only.
    pub fn owner_user_id(&self) -> UserId {
        self.owner_user_id
    }

    /// Whether the departure is still active.
    pub fn active(&self) -> bool {
        self.active
    }

    /// Calendar day the departure falls on.
    pub fn travel_day(&self) -> NaiveDate {
        self.when_local.date()
    }
}
