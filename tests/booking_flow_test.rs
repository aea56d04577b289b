mod common;

use chrono::{Duration, Local, NaiveDate};
use voyago_booking::models::traveler::{PaymentInfo, TicketCounts, Traveler};
use voyago_booking::store::booking_session::BookingSession;
use voyago_booking::store::ticket_ledger::{AddOutcome, TicketLedger};

fn traveler() -> Traveler {
    Traveler {
        name: "Mario".to_string(),
        surname: "Rossi".to_string(),
        phone: "+39 055 123 9876".to_string(),
        email: "mario@example.com".to_string(),
    }
}

fn payment() -> PaymentInfo {
    PaymentInfo {
        card_number: "4539 1488 0343 6467".to_string(),
        card_holder: "MARIO ROSSI".to_string(),
        expiry_date: "12/30".to_string(),
        cvv: "123".to_string(),
    }
}

fn tour_date() -> NaiveDate {
    Local::now().date_naive() + Duration::days(10)
}

/// Walk a session through all four steps and return it completed.
fn completed_session() -> BookingSession {
    let mut session = BookingSession::new();
    session.set_package(&common::sample_package());
    session.set_tickets(TicketCounts { adult: 2, child: 1, infant: 0 });
    session.set_date_time(tour_date(), "10:00");
    assert!(session.next_step());
    session.set_traveler(traveler());
    assert!(session.next_step());
    session.set_payment_info(payment());
    assert!(session.next_step());
    session.complete_booking();
    session
}

#[test]
fn full_wizard_produces_a_bk_reference() {
    common::init();
    let session = completed_session();
    assert!(session.booking_complete);
    assert_eq!(session.current_step, 4);
    assert!(session.ref_number.as_deref().unwrap().starts_with("BK-"));
}

#[test]
fn completion_is_idempotent() {
    common::init();
    let mut session = completed_session();
    let first = session.ref_number.clone().unwrap();
    assert_eq!(session.complete_booking(), first);
}

#[test]
fn sequencer_blocks_every_incomplete_step() {
    common::init();
    let mut session = BookingSession::new();

    // Step 1 needs package, tickets, date and time together.
    assert!(!session.next_step());
    session.set_package(&common::sample_package());
    assert!(!session.next_step());
    session.set_tickets(TicketCounts { adult: 0, child: 0, infant: 2 });
    session.set_date_time(tour_date(), "10:00");
    // Infants alone do not count as a paying ticket.
    assert!(!session.next_step());
    session.set_tickets(TicketCounts { adult: 1, child: 0, infant: 2 });
    assert!(session.next_step());

    // Step 2 needs every traveler field.
    let mut incomplete = traveler();
    incomplete.email = "   ".to_string();
    session.set_traveler(incomplete);
    assert!(!session.next_step());
    session.set_traveler(traveler());
    assert!(session.next_step());

    // Step 3 needs the card details.
    assert!(!session.next_step());
    session.set_payment_info(payment());
    assert!(session.next_step());
    assert_eq!(session.current_step, 4);
}

#[test]
fn step_navigation_stays_within_bounds() {
    common::init();
    let mut session = BookingSession::new();
    session.prev_step();
    session.prev_step();
    assert_eq!(session.current_step, 1);

    session.go_to_step(200);
    assert_eq!(session.current_step, 4);
    assert!(!session.next_step());
    session.go_to_step(0);
    assert_eq!(session.current_step, 1);
}

#[test]
fn reset_restores_the_initial_state() {
    common::init();
    let mut session = completed_session();
    session.reset();

    assert_eq!(session.current_step, 1);
    assert!(session.package.is_none());
    assert_eq!(session.tickets, TicketCounts::default());
    assert!(session.selected_date.is_none());
    assert!(session.selected_time.is_none());
    assert_eq!(session.traveler, Traveler::default());
    assert_eq!(session.payment, PaymentInfo::default());
    assert!(session.applied_discount.is_none());
    assert!(!session.booking_complete);
    assert!(session.ref_number.is_none());
}

#[test]
fn completed_booking_feeds_the_ledger_exactly_once() {
    common::init();
    let session = completed_session();
    let ticket = session.ticket_snapshot().unwrap();
    assert_eq!(ticket.subtotal, 2.0 * 34.0 + 20.4);
    assert_eq!(ticket.payment_method, "card •••• 6467");

    let mut ledger = TicketLedger::new();
    assert!(matches!(ledger.add(ticket.clone()), AddOutcome::Added(_)));
    // Replaying the completion does not double-book.
    assert_eq!(ledger.add(ticket), AddOutcome::AlreadyExists);
    assert_eq!(ledger.all().len(), 1);
}

#[test]
fn session_state_survives_a_restart_without_payment_details() {
    common::init();
    let storage = common::temp_storage("booking-persist");

    let mut session = BookingSession::with_storage(storage.clone());
    session.set_package(&common::sample_package());
    session.set_tickets(TicketCounts { adult: 2, child: 0, infant: 0 });
    session.set_date_time(tour_date(), "14:00");
    session.set_traveler(traveler());
    session.next_step();
    session.set_payment_info(payment());

    let restored = BookingSession::with_storage(storage);
    assert_eq!(restored.package.as_ref().unwrap().name, "luccaBikeTour");
    assert_eq!(restored.tickets.adult, 2);
    assert_eq!(restored.traveler, traveler());
    // Card details and wizard position never persist.
    assert_eq!(restored.payment, PaymentInfo::default());
    assert_eq!(restored.current_step, 1);
}

#[test]
fn reset_drops_the_persisted_copy() {
    common::init();
    let storage = common::temp_storage("booking-reset");

    let mut session = BookingSession::with_storage(storage.clone());
    session.set_package(&common::sample_package());
    session.reset();

    let restored = BookingSession::with_storage(storage);
    assert!(restored.package.is_none());
}
