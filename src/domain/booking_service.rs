//! Booking engine orchestrating identity, departures, and tickets.
//!
//! Implements the per-(user, day) reservation state machine
//! `NoTicket -> Reserved -> NoTicket`. There is no explicit day-rollover
//! transition: the date filters in the ticket queries make yesterday's
//! tickets invisible to today's checks.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use mockable::Clock;
use tracing::{debug, info};

use crate::config::BookingConfig;
use crate::domain::departure::{Departure, Station};
use crate::domain::error::BookingError;
use crate::domain::ports::{
    DeparturePersistenceError, DepartureRepository, NewDeparture, NewTicket, NewUser,
    TicketPersistenceError, TicketRepository, UserPersistenceError, UserRepository,
};
use crate::domain::schedule::ScheduleRow;
use crate::domain::ticket::Ticket;
use crate::domain::user::{DisplayName, ExternalUserId, User};

/// Outcome of [`BookingService::propose_departure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartureProposal {
    pub departure: Departure,
    /// The proposer's auto-reserved seat; `None` when they already held a
    /// ticket for today. The departure is created either way.
    pub ticket: Option<Ticket>,
}

/// Outcome of [`BookingService::reserve_ticket`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reservation {
    /// A seat was issued on the matched departure.
    Confirmed { ticket: Ticket, departure: Departure },
    /// No slot was specified. Not an error: the caller should re-invoke
    /// with a selection from the attached list, which may be empty.
    SelectionRequired { departures: Vec<Departure> },
}

/// Outcome of [`BookingService::revoke_ticket`]: the now-inactive ticket
/// with its departure attached for confirmation rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokedTicket {
    pub ticket: Ticket,
    pub departure: Departure,
}

/// Booking engine.
///
/// Wires the identity registry, departure registry, and ticket ledger into
/// the four user-facing operations. Every operation is a bounded synchronous
/// unit of work; the uniqueness invariants are enforced by the storage
/// layer, so concurrent conflicting calls resolve to exactly one winner.
pub struct BookingService<U, D, T> {
    users: Arc<U>,
    departures: Arc<D>,
    tickets: Arc<T>,
    clock: Arc<dyn Clock>,
    config: BookingConfig,
}

impl<U, D, T> BookingService<U, D, T>
where
    U: UserRepository,
    D: DepartureRepository,
    T: TicketRepository,
{
    /// Create a new booking engine over the given repositories.
    pub fn new(
        users: Arc<U>,
        departures: Arc<D>,
        tickets: Arc<T>,
        clock: Arc<dyn Clock>,
        config: BookingConfig,
    ) -> Self {
        Self {
            users,
            departures,
            tickets,
            clock,
            config,
        }
    }

    /// Current calendar date in the configured time zone.
    fn today(&self) -> NaiveDate {
        self.clock
            .utc()
            .with_timezone(&self.config.timezone)
            .date_naive()
    }

    /// Propose a departure for today and auto-reserve the proposer's seat.
    ///
    /// # Errors
    ///
    /// [`BookingError::Policy`] when the time fails window validation,
    /// [`BookingError::DuplicateDeparture`] when the slot is already taken
    /// (active or not), and [`BookingError::Storage`] on backing-store
    /// failure. A proposer who already holds a ticket is not an error: the
    /// departure is created and the proposal carries no ticket.
    pub fn propose_departure(
        &self,
        external_id: &ExternalUserId,
        display_name_hint: &DisplayName,
        when_local: NaiveDateTime,
        station: Station,
    ) -> Result<DepartureProposal, BookingError> {
        let user = self.resolve_user(external_id, display_name_hint)?;
        let today = self.today();
        let when_local = self.config.window.validate(when_local, today)?;

        let departure = self
            .departures
            .insert(NewDeparture {
                when_local,
                station,
                owner_user_id: user.id(),
            })
            .map_err(map_departure_insert_error)?;
        info!(
            departure_id = %departure.id(),
            station = %departure.station(),
            when_local = %departure.when_local(),
            "departure created"
        );

        let ticket = match self.reserve_for(&user, &departure, today) {
            Ok(ticket) => Some(ticket),
            Err(BookingError::AlreadyBooked) => {
                info!(
                    user_id = %user.id(),
                    departure_id = %departure.id(),
                    "proposer already booked today, departure left without auto reservation"
                );
                None
            }
            Err(err) => return Err(err),
        };

        Ok(DepartureProposal { departure, ticket })
    }

    /// Reserve a seat on today's departure at `slot`, or list the available
    /// departures when no slot is given.
    ///
    /// The already-booked check runs before the slot is even looked at, so a
    /// user with an existing reservation gets a uniform rejection regardless
    /// of what they pass.
    ///
    /// # Errors
    ///
    /// [`BookingError::AlreadyBooked`] when the user holds an active ticket
    /// today, [`BookingError::Policy`] when the slot time fails window
    /// validation, [`BookingError::NoSuchDeparture`] when the slot matches
    /// nothing, and [`BookingError::Storage`] on backing-store failure.
    pub fn reserve_ticket(
        &self,
        external_id: &ExternalUserId,
        display_name_hint: &DisplayName,
        slot: Option<(NaiveDateTime, Station)>,
    ) -> Result<Reservation, BookingError> {
        let user = self.resolve_user(external_id, display_name_hint)?;
        let today = self.today();

        if self
            .tickets
            .find_active_for_user_on(user.id(), today)
            .map_err(map_ticket_error)?
            .is_some()
        {
            return Err(BookingError::AlreadyBooked);
        }

        let Some((when_local, station)) = slot else {
            let departures = self
                .departures
                .list_active_on(today)
                .map_err(map_departure_error)?;
            return Ok(Reservation::SelectionRequired { departures });
        };

        // Slots on other days or outside the window must never gain tickets:
        // a past-day reservation would be unreachable for revocation.
        let when_local = self.config.window.validate(when_local, today)?;

        let departure = self
            .departures
            .find_by_slot(when_local, &station)
            .map_err(map_departure_error)?
            .ok_or(BookingError::NoSuchDeparture { when_local, station })?;

        let ticket = self.issue(&user, &departure)?;
        Ok(Reservation::Confirmed { ticket, departure })
    }

    /// Revoke the user's active ticket for today.
    ///
    /// # Errors
    ///
    /// [`BookingError::NoActiveTicket`] when no active ticket exists today;
    /// no mutation is performed in that case.
    pub fn revoke_ticket(
        &self,
        external_id: &ExternalUserId,
        display_name_hint: &DisplayName,
    ) -> Result<RevokedTicket, BookingError> {
        let user = self.resolve_user(external_id, display_name_hint)?;
        let today = self.today();

        let Some((ticket, departure)) = self
            .tickets
            .find_active_for_user_on(user.id(), today)
            .map_err(map_ticket_error)?
        else {
            return Err(BookingError::NoActiveTicket);
        };

        let ticket = match self.tickets.revoke(ticket.id()) {
            Ok(ticket) => ticket,
            Err(TicketPersistenceError::NotFound { .. }) => {
                return Err(BookingError::TicketNotFound);
            }
            Err(err) => return Err(map_ticket_error(err)),
        };
        info!(
            ticket_id = %ticket.id(),
            user_id = %user.id(),
            departure_id = %departure.id(),
            "ticket revoked"
        );

        Ok(RevokedTicket { ticket, departure })
    }

    /// Today's schedule: each active departure with its passenger names.
    ///
    /// Pure read; departures ordered ascending by time, passengers in ticket
    /// creation order.
    pub fn list_today(&self) -> Result<Vec<ScheduleRow>, BookingError> {
        let today = self.today();
        let departures = self
            .departures
            .list_active_on(today)
            .map_err(map_departure_error)?;

        let mut rows = Vec::with_capacity(departures.len());
        for departure in departures {
            let passengers = self
                .tickets
                .list_active_for_departure(departure.id())
                .map_err(map_ticket_error)?
                .into_iter()
                .map(|(_, user)| user.display_name().to_string())
                .collect();
            rows.push(ScheduleRow {
                departure_id: departure.id(),
                departs_at: departure.when_local().time(),
                station: departure.station().clone(),
                passengers,
            });
        }
        Ok(rows)
    }

    /// Look up the user by external handle, creating a row on first contact.
    ///
    /// "Create if absent" is best effort: a duplicate-insert rejection means
    /// another request won the first-contact race, so the lookup is retried
    /// exactly once.
    fn resolve_user(
        &self,
        external_id: &ExternalUserId,
        display_name_hint: &DisplayName,
    ) -> Result<User, BookingError> {
        if let Some(user) = self
            .users
            .find_by_external_id(external_id)
            .map_err(map_user_error)?
        {
            return Ok(user);
        }

        match self.users.insert(NewUser {
            external_id: external_id.clone(),
            display_name: display_name_hint.clone(),
        }) {
            Ok(user) => {
                info!(%external_id, "registered user on first contact");
                Ok(user)
            }
            Err(UserPersistenceError::DuplicateExternalId { .. }) => {
                debug!(%external_id, "lost first-contact race, retrying lookup");
                self.users
                    .find_by_external_id(external_id)
                    .map_err(map_user_error)?
                    .ok_or_else(|| {
                        BookingError::storage("user row missing after duplicate insert rejection")
                    })
            }
            Err(err) => Err(map_user_error(err)),
        }
    }

    /// Check-then-issue for a known departure (the auto-reserve path).
    fn reserve_for(
        &self,
        user: &User,
        departure: &Departure,
        today: NaiveDate,
    ) -> Result<Ticket, BookingError> {
        if self
            .tickets
            .find_active_for_user_on(user.id(), today)
            .map_err(map_ticket_error)?
            .is_some()
        {
            return Err(BookingError::AlreadyBooked);
        }
        self.issue(user, departure)
    }

    /// Insert the ticket. The partial unique index backs the engine's
    /// pre-check, so a racing duplicate surfaces as `AlreadyBooked` here.
    fn issue(&self, user: &User, departure: &Departure) -> Result<Ticket, BookingError> {
        match self.tickets.insert(NewTicket {
            departure_id: departure.id(),
            user_id: user.id(),
            travel_day: departure.travel_day(),
        }) {
            Ok(ticket) => {
                info!(
                    ticket_id = %ticket.id(),
                    user_id = %user.id(),
                    departure_id = %departure.id(),
                    "ticket issued"
                );
                Ok(ticket)
            }
            Err(TicketPersistenceError::DuplicateActiveTicket) => Err(BookingError::AlreadyBooked),
            Err(err) => Err(map_ticket_error(err)),
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> BookingError {
    BookingError::storage(error.to_string())
}

fn map_departure_error(error: DeparturePersistenceError) -> BookingError {
    BookingError::storage(error.to_string())
}

fn map_departure_insert_error(error: DeparturePersistenceError) -> BookingError {
    match error {
        DeparturePersistenceError::DuplicateSlot {
            when_local,
            station,
        } => BookingError::DuplicateDeparture {
            when_local,
            station,
        },
        other => BookingError::storage(other.to_string()),
    }
}

fn map_ticket_error(error: TicketPersistenceError) -> BookingError {
    BookingError::storage(error.to_string())
}

#[cfg(test)]
#[path = "booking_service_tests.rs"]
mod tests;
