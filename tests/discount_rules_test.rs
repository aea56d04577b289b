mod common;

use chrono::{Duration, Local};
use voyago_booking::models::traveler::TicketCounts;
use voyago_booking::services::discount_service::{DiscountError, DiscountService};
use voyago_booking::store::booking_session::BookingSession;
use voyago_booking::store::service_session::ServiceBookingSession;

#[test]
fn group_discount_kicks_in_through_the_booking_session() {
    common::init();
    let mut session = BookingSession::new();
    session.set_package(&common::sample_package());
    session.set_tickets(TicketCounts { adult: 7, child: 3, infant: 1 });

    let mut discounts = DiscountService::new();
    let applied = discounts.apply_automatic(&session.discount_snapshot()).unwrap();
    assert_eq!(applied.id, "GROUP_DISCOUNT");
    assert_eq!(applied.percentage, 25.0);
    // Infants do not count toward the group size.
    assert_eq!(applied.applied_reason.as_deref(), Some("Group of 10 people"));

    session.set_applied_discount(Some(applied));
    let subtotal = 7.0 * 34.0 + 3.0 * 20.4;
    assert!((session.calculate_total() - subtotal * 0.75).abs() < 1e-9);
}

#[test]
fn early_bird_applies_only_when_far_enough_out() {
    common::init();
    let mut session = BookingSession::new();
    session.set_package(&common::sample_package());
    session.set_date_time(Local::now().date_naive() + Duration::days(45), "10:00");

    let discounts = DiscountService::new();
    let applied = discounts.check_automatic(&session.discount_snapshot()).unwrap();
    assert_eq!(applied.id, "EARLY_BIRD");

    session.set_date_time(Local::now().date_naive() + Duration::days(5), "10:00");
    assert!(discounts.check_automatic(&session.discount_snapshot()).is_none());
}

#[test]
fn group_rule_outranks_early_bird_when_both_match() {
    common::init();
    let mut session = BookingSession::new();
    session.set_tickets(TicketCounts { adult: 10, child: 0, infant: 0 });
    session.set_date_time(Local::now().date_naive() + Duration::days(60), "10:00");

    let discounts = DiscountService::new();
    let applied = discounts.check_automatic(&session.discount_snapshot()).unwrap();
    assert_eq!(applied.id, "GROUP_DISCOUNT");
}

#[test]
fn weaker_code_is_declined_in_favor_of_the_automatic_rule() {
    common::init();
    let mut session = BookingSession::new();
    session.set_tickets(TicketCounts { adult: 12, child: 0, infant: 0 });

    let mut discounts = DiscountService::new();
    let err = discounts
        .apply_code("WELCOME10", &session.discount_snapshot())
        .unwrap_err();
    let DiscountError::BetterDiscountAvailable(better) = err else {
        panic!("expected BetterDiscountAvailable");
    };
    assert_eq!(better.percentage, 25.0);
    assert_eq!(discounts.applied_discount().unwrap().id, "GROUP_DISCOUNT");
}

#[test]
fn stronger_code_survives_booking_data_changes() {
    common::init();
    let mut session = BookingSession::new();
    session.set_tickets(TicketCounts { adult: 12, child: 0, infant: 0 });

    let mut discounts = DiscountService::new();
    let applied = discounts
        .apply_code("VOYAGO30", &session.discount_snapshot())
        .unwrap();
    assert_eq!(applied.percentage, 30.0);

    // Shrinking the group drops the automatic rule but keeps the code.
    session.set_tickets(TicketCounts { adult: 2, child: 0, infant: 0 });
    let active = discounts.apply_automatic(&session.discount_snapshot()).unwrap();
    assert_eq!(active.id, "VOYAGO30");
}

#[test]
fn removing_a_code_falls_back_to_the_automatic_rule() {
    common::init();
    let mut session = BookingSession::new();
    session.set_tickets(TicketCounts { adult: 11, child: 0, infant: 0 });

    let mut discounts = DiscountService::new();
    discounts
        .apply_code("VOYAGO30", &session.discount_snapshot())
        .unwrap();
    let fallback = discounts.remove_code(&session.discount_snapshot()).unwrap();
    assert_eq!(fallback.id, "GROUP_DISCOUNT");
}

#[test]
fn service_quantity_counts_toward_the_group_rule() {
    common::init();
    let mut session = ServiceBookingSession::new();
    session.set_service(&common::sample_service());
    session.set_service_type("city");
    session.set_quantity(10);

    let mut discounts = DiscountService::new();
    let applied = discounts.apply_automatic(&session.discount_snapshot()).unwrap();
    assert_eq!(applied.id, "GROUP_DISCOUNT");

    session.set_applied_discount(Some(applied));
    // 10 city bikes for the default single hour, 25% off.
    assert_eq!(session.calculate_subtotal(), 150.0);
    assert_eq!(session.calculate_total(), 112.5);
}

#[test]
fn family_code_needs_a_child_ticket_on_the_booking() {
    common::init();
    let mut session = BookingSession::new();
    session.set_tickets(TicketCounts { adult: 2, child: 0, infant: 0 });

    let mut discounts = DiscountService::new();
    let err = discounts
        .apply_code("FAMILY15", &session.discount_snapshot())
        .unwrap_err();
    assert!(matches!(err, DiscountError::PreconditionFailed(_)));

    session.set_tickets(TicketCounts { adult: 2, child: 1, infant: 0 });
    let applied = discounts
        .apply_code("family15", &session.discount_snapshot())
        .unwrap();
    assert_eq!(applied.percentage, 15.0);
}

#[test]
fn single_use_code_is_spent_at_completion() {
    common::init();
    let session = BookingSession::new();
    let snapshot = session.discount_snapshot();

    let mut discounts = DiscountService::new();
    discounts.apply_code("WELCOME10", &snapshot).unwrap();
    discounts.mark_redeemed("WELCOME10");
    discounts.clear();

    let err = discounts.apply_code("WELCOME10", &snapshot).unwrap_err();
    assert_eq!(err, DiscountError::AlreadyRedeemed);
}
