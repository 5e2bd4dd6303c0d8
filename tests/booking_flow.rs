//! End-to-end booking scenarios over the SQLite adapters.
//!
//! These drive the engine through the real Diesel repositories so the
//! schema's unique indexes, not test doubles, enforce the invariants.

use std::sync::{Arc, Once};

use chrono::{DateTime, NaiveDateTime, Utc};
use rstest::rstest;

use mensatrain::BookingConfig;
use mensatrain::domain::{
    BookingError, BookingService, DisplayName, ExternalUserId, Reservation, Station,
};
use mensatrain::outbound::persistence::{
    DieselDepartureRepository, DieselTicketRepository, DieselUserRepository,
};
use mensatrain::test_support::{MutableClock, in_memory_pool};

type Engine =
    BookingService<DieselUserRepository, DieselDepartureRepository, DieselTicketRepository>;

struct Fixture {
    service: Engine,
    clock: Arc<MutableClock>,
}

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Engine over a fresh in-memory database, pinned to a Monday morning in
/// Berlin (2026-03-02 09:00 local).
fn fixture() -> Fixture {
    init_tracing();
    let pool = in_memory_pool();
    let clock = Arc::new(MutableClock::new(
        DateTime::parse_from_rfc3339("2026-03-02T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc),
    ));
    let service = BookingService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselDepartureRepository::new(pool.clone())),
        Arc::new(DieselTicketRepository::new(pool)),
        clock.clone(),
        BookingConfig::default(),
    );
    Fixture { service, clock }
}

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2026, 3, 2)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn ext(id: &str) -> ExternalUserId {
    ExternalUserId::new(id).unwrap()
}

fn name(name: &str) -> DisplayName {
    DisplayName::new(name).unwrap()
}

fn station(name: &str) -> Station {
    Station::new(name).unwrap()
}

#[rstest]
fn full_day_of_bookings() {
    let fx = fixture();

    // Alice opens a 12:00 train from Central and is booked onto it.
    let proposal = fx
        .service
        .propose_departure(&ext("alice"), &name("Alice"), at(12, 0), station("Central"))
        .unwrap();
    let ticket = proposal.ticket.expect("proposer auto-reserved");
    assert_eq!(ticket.departure_id(), proposal.departure.id());

    // Bob joins by naming the slot.
    let reservation = fx
        .service
        .reserve_ticket(
            &ext("bob"),
            &name("Bob"),
            Some((at(12, 0), station("Central"))),
        )
        .unwrap();
    assert!(matches!(reservation, Reservation::Confirmed { .. }));

    // Bob cannot hold a second seat, not even on another train.
    let second = fx
        .service
        .propose_departure(&ext("carol"), &name("Carol"), at(13, 0), station("East"))
        .unwrap();
    assert!(second.ticket.is_some());
    let err = fx
        .service
        .reserve_ticket(&ext("bob"), &name("Bob"), Some((at(13, 0), station("East"))))
        .unwrap_err();
    assert_eq!(err, BookingError::AlreadyBooked);

    // The schedule lists both trains in time order with their passengers.
    let rows = fx.service.list_today().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].departs_at_label(), "12:00");
    assert_eq!(rows[0].passengers, vec!["Alice", "Bob"]);
    assert_eq!(rows[1].departs_at_label(), "13:00");
    assert_eq!(rows[1].passengers, vec!["Carol"]);

    // Bob bails out and rebooks onto the later train.
    let revoked = fx.service.revoke_ticket(&ext("bob"), &name("Bob")).unwrap();
    assert!(!revoked.ticket.active());
    let rebooked = fx
        .service
        .reserve_ticket(&ext("bob"), &name("Bob"), Some((at(13, 0), station("East"))))
        .unwrap();
    let Reservation::Confirmed { departure, .. } = rebooked else {
        panic!("expected a confirmed reservation");
    };
    assert_eq!(departure.station().as_ref(), "East");
}

#[rstest]
fn duplicate_slot_is_rejected_across_proposers() {
    let fx = fixture();
    fx.service
        .propose_departure(&ext("alice"), &name("Alice"), at(12, 0), station("Central"))
        .unwrap();

    let err = fx
        .service
        .propose_departure(&ext("bob"), &name("Bob"), at(12, 0), station("Central"))
        .unwrap_err();

    assert!(matches!(err, BookingError::DuplicateDeparture { .. }));
}

#[rstest]
fn reserve_without_slot_offers_todays_departures() {
    let fx = fixture();
    fx.service
        .propose_departure(&ext("alice"), &name("Alice"), at(13, 0), station("East"))
        .unwrap();
    fx.service
        .propose_departure(&ext("alice"), &name("Alice"), at(11, 30), station("Central"))
        .unwrap();

    let reservation = fx
        .service
        .reserve_ticket(&ext("bob"), &name("Bob"), None)
        .unwrap();

    let Reservation::SelectionRequired { departures } = reservation else {
        panic!("expected a selection prompt");
    };
    let stations: Vec<&str> = departures.iter().map(|d| d.station().as_ref()).collect();
    assert_eq!(stations, vec!["Central", "East"]);
}

#[rstest]
fn empty_schedule_still_prompts_for_selection() {
    let fx = fixture();

    let reservation = fx
        .service
        .reserve_ticket(&ext("bob"), &name("Bob"), None)
        .unwrap();

    assert_eq!(
        reservation,
        Reservation::SelectionRequired { departures: vec![] }
    );
}

#[rstest]
fn out_of_window_proposals_are_rejected() {
    let fx = fixture();

    let early = fx
        .service
        .propose_departure(&ext("alice"), &name("Alice"), at(10, 59), station("Central"))
        .unwrap_err();
    let late = fx
        .service
        .propose_departure(&ext("alice"), &name("Alice"), at(15, 31), station("Central"))
        .unwrap_err();

    assert!(matches!(early, BookingError::Policy(_)));
    assert!(matches!(late, BookingError::Policy(_)));

    // 15:30 itself is still inside the window.
    assert!(
        fx.service
            .propose_departure(&ext("alice"), &name("Alice"), at(15, 30), station("Central"))
            .is_ok()
    );
}

#[rstest]
fn yesterdays_ticket_does_not_block_today() {
    let fx = fixture();
    fx.service
        .propose_departure(&ext("alice"), &name("Alice"), at(12, 0), station("Central"))
        .unwrap();
    let err = fx.service.revoke_ticket(&ext("bob"), &name("Bob")).unwrap_err();
    assert_eq!(err, BookingError::NoActiveTicket);

    fx.clock.advance_days(1);

    // Yesterday's slot is gone from the schedule and cannot be reserved,
    // even named exactly; Alice is free again.
    assert!(fx.service.list_today().unwrap().is_empty());
    let err = fx
        .service
        .reserve_ticket(
            &ext("bob"),
            &name("Bob"),
            Some((at(12, 0), station("Central"))),
        )
        .unwrap_err();
    assert!(matches!(err, BookingError::Policy(_)));
    let tuesday_noon = at(12, 0) + chrono::TimeDelta::days(1);
    let proposal = fx
        .service
        .propose_departure(&ext("alice"), &name("Alice"), tuesday_noon, station("Central"))
        .unwrap();
    assert!(proposal.ticket.is_some());

    // Alice's Monday ticket is invisible to Tuesday's revoke.
    fx.service.revoke_ticket(&ext("alice"), &name("Alice")).unwrap();
    let err = fx
        .service
        .revoke_ticket(&ext("alice"), &name("Alice"))
        .unwrap_err();
    assert_eq!(err, BookingError::NoActiveTicket);
}
