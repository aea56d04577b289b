use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::local::LocalStorage;
use crate::models::discount::{AppliedDiscount, BookingSnapshot};
use crate::models::package::{PackageSelection, TourPackage};
use crate::models::ticket::{NewTicket, TicketSubject};
use crate::models::traveler::{PaymentInfo, TicketCounts, TicketKind, Traveler};
use crate::services::pricing_service::{PricingService, CHILD_PRICE_RATIO};
use crate::store::{BOOKING_STORAGE_KEY, MAX_STEP, MIN_STEP};

/// The subset of session state that survives a restart. Payment details, the
/// current step, and completion flags deliberately stay out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedBooking {
    package: Option<PackageSelection>,
    tickets: TicketCounts,
    selected_date: Option<NaiveDate>,
    selected_time: Option<String>,
    traveler: Traveler,
    applied_discount: Option<AppliedDiscount>,
}

/// State machine for the four-step package booking wizard:
/// 1 package + tickets + date/time, 2 traveler details, 3 payment, 4 summary.
///
/// Every mutation is written through to storage immediately; the step
/// sequencer refuses to advance past an incomplete step.
#[derive(Debug)]
pub struct BookingSession {
    pub current_step: u8,
    pub package: Option<PackageSelection>,
    pub tickets: TicketCounts,
    pub selected_date: Option<NaiveDate>,
    pub selected_time: Option<String>,
    pub traveler: Traveler,
    pub payment: PaymentInfo,
    pub applied_discount: Option<AppliedDiscount>,
    pub booking_complete: bool,
    pub ref_number: Option<String>,
    storage: Option<LocalStorage>,
}

impl Default for BookingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingSession {
    pub fn new() -> Self {
        Self {
            current_step: MIN_STEP,
            package: None,
            tickets: TicketCounts::default(),
            selected_date: None,
            selected_time: None,
            traveler: Traveler::default(),
            payment: PaymentInfo::default(),
            applied_discount: None,
            booking_complete: false,
            ref_number: None,
            storage: None,
        }
    }

    /// Start a session on top of persisted state, resuming any saved
    /// selection at step 1.
    pub fn with_storage(storage: LocalStorage) -> Self {
        let mut session = Self::new();
        if let Some(saved) = storage.load::<PersistedBooking>(BOOKING_STORAGE_KEY) {
            session.package = saved.package;
            session.tickets = saved.tickets;
            session.selected_date = saved.selected_date;
            session.selected_time = saved.selected_time;
            session.traveler = saved.traveler;
            session.applied_discount = saved.applied_discount;
        }
        session.storage = Some(storage);
        session
    }

    /// Select a tour, deriving the per-tier unit prices from its display
    /// price. Children pay 60%, infants travel free.
    pub fn set_package(&mut self, package: &TourPackage) {
        let adult_price = PricingService::parse_display_price(&package.price);
        self.package = Some(PackageSelection {
            id: package.identifier().map(str::to_string),
            name: package.title_key.clone(),
            image: package.img.clone(),
            price: package.price.clone(),
            duration: package.duration.clone(),
            adult_price,
            child_price: adult_price * CHILD_PRICE_RATIO,
            infant_price: 0.0,
        });
        self.persist();
    }

    pub fn set_tickets(&mut self, tickets: TicketCounts) {
        self.tickets = tickets;
        self.persist();
    }

    /// Adjust one counter by a delta, clamped at zero.
    pub fn update_ticket_count(&mut self, kind: TicketKind, delta: i64) {
        let counter = match kind {
            TicketKind::Adult => &mut self.tickets.adult,
            TicketKind::Child => &mut self.tickets.child,
            TicketKind::Infant => &mut self.tickets.infant,
        };
        *counter = (i64::from(*counter) + delta).max(0) as u32;
        self.persist();
    }

    pub fn set_date_time(&mut self, date: NaiveDate, time: impl Into<String>) {
        self.selected_date = Some(date);
        self.selected_time = Some(time.into());
        self.persist();
    }

    pub fn set_traveler(&mut self, traveler: Traveler) {
        self.traveler = traveler;
        self.persist();
    }

    /// Card details live only in memory.
    pub fn set_payment_info(&mut self, payment: PaymentInfo) {
        self.payment = payment;
    }

    pub fn set_applied_discount(&mut self, discount: Option<AppliedDiscount>) {
        self.applied_discount = discount;
        self.persist();
    }

    /// Advance one step if the current one is complete. Returns whether the
    /// step actually changed.
    pub fn next_step(&mut self) -> bool {
        if self.current_step >= MAX_STEP || !self.can_proceed_from(self.current_step) {
            return false;
        }
        self.current_step += 1;
        true
    }

    pub fn prev_step(&mut self) {
        if self.current_step > MIN_STEP {
            self.current_step -= 1;
        }
    }

    pub fn go_to_step(&mut self, step: u8) {
        self.current_step = step.clamp(MIN_STEP, MAX_STEP);
    }

    /// Completeness rules per step: 1 needs a package, at least one paying
    /// ticket, a date and a time; 2 needs traveler details; 3 needs payment
    /// details.
    pub fn can_proceed_from(&self, step: u8) -> bool {
        match step {
            1 => {
                self.package.is_some()
                    && (self.tickets.adult > 0 || self.tickets.child > 0)
                    && self.selected_date.is_some()
                    && self.selected_time.is_some()
            }
            2 => self.traveler.is_complete(),
            3 => self.payment.is_complete(),
            _ => true,
        }
    }

    pub fn calculate_subtotal(&self) -> f64 {
        match &self.package {
            Some(package) => PricingService::package_subtotal(&self.tickets, package),
            None => 0.0,
        }
    }

    pub fn discount_amount(&self) -> f64 {
        match &self.applied_discount {
            Some(discount) => self.calculate_subtotal() * discount.percentage / 100.0,
            None => 0.0,
        }
    }

    pub fn calculate_total(&self) -> f64 {
        (self.calculate_subtotal() - self.discount_amount()).max(0.0)
    }

    /// Finish the booking and mint a reference number. Idempotent: a second
    /// call returns the existing reference without minting a new one.
    pub fn complete_booking(&mut self) -> String {
        if self.booking_complete {
            if let Some(existing) = &self.ref_number {
                return existing.clone();
            }
        }
        let ref_number = format!("BK-{}", Utc::now().timestamp_millis());
        self.ref_number = Some(ref_number.clone());
        self.booking_complete = true;
        self.current_step = MAX_STEP;
        ref_number
    }

    /// The booking data the discount rules evaluate.
    pub fn discount_snapshot(&self) -> BookingSnapshot {
        BookingSnapshot {
            adult_tickets: self.tickets.adult,
            child_tickets: self.tickets.child,
            selected_date: self.selected_date,
        }
    }

    /// Freeze the completed booking into a ledger ticket. None until the
    /// booking is complete.
    pub fn ticket_snapshot(&self) -> Option<NewTicket> {
        if !self.booking_complete {
            return None;
        }
        let package = self.package.as_ref()?;
        let ref_number = self.ref_number.clone()?;
        Some(NewTicket {
            ref_number,
            user_email: self.traveler.email.trim().to_lowercase(),
            subject: TicketSubject::Package {
                id: package.id.clone(),
                name: package.name.clone(),
                tickets: self.tickets,
            },
            date: self.selected_date,
            time: self.selected_time.clone(),
            holder_name: self.traveler.full_name(),
            subtotal: self.calculate_subtotal(),
            discount_percentage: self.applied_discount.as_ref().map(|d| d.percentage),
            total: self.calculate_total(),
            payment_method: self.payment.masked_label(),
        })
    }

    /// Back to the initial state, dropping any persisted copy.
    pub fn reset(&mut self) {
        let storage = self.storage.take();
        *self = Self::new();
        if let Some(storage) = storage {
            storage.remove(BOOKING_STORAGE_KEY);
            self.storage = Some(storage);
        }
    }

    fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let state = PersistedBooking {
            package: self.package.clone(),
            tickets: self.tickets,
            selected_date: self.selected_date,
            selected_time: self.selected_time.clone(),
            traveler: self.traveler.clone(),
            applied_discount: self.applied_discount.clone(),
        };
        if let Err(err) = storage.save(BOOKING_STORAGE_KEY, &state) {
            log::warn!("Failed to persist booking state: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_package() -> TourPackage {
        serde_json::from_str(
            r#"{"id": 1, "titleKey": "luccaBikeTour", "price": "€34", "duration": "3 hours"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_set_package_derives_tier_prices() {
        let mut session = BookingSession::new();
        session.set_package(&sample_package());
        let package = session.package.as_ref().unwrap();
        assert_eq!(package.adult_price, 34.0);
        assert_eq!(package.child_price, 20.4);
        assert_eq!(package.infant_price, 0.0);
    }

    #[test]
    fn test_ticket_counter_clamps_at_zero() {
        let mut session = BookingSession::new();
        session.update_ticket_count(TicketKind::Adult, -5);
        assert_eq!(session.tickets.adult, 0);
        session.update_ticket_count(TicketKind::Child, 3);
        assert_eq!(session.tickets.child, 3);
    }

    #[test]
    fn test_next_step_refuses_incomplete_step() {
        let mut session = BookingSession::new();
        assert!(!session.next_step());
        assert_eq!(session.current_step, 1);

        session.set_package(&sample_package());
        session.set_date_time(NaiveDate::from_ymd_opt(2027, 6, 1).unwrap(), "10:00");
        assert!(session.next_step());
        assert_eq!(session.current_step, 2);

        // Traveler details still missing.
        assert!(!session.next_step());
    }

    #[test]
    fn test_step_bounds() {
        let mut session = BookingSession::new();
        session.prev_step();
        assert_eq!(session.current_step, 1);
        session.go_to_step(9);
        assert_eq!(session.current_step, 4);
        assert!(!session.next_step());
        session.go_to_step(0);
        assert_eq!(session.current_step, 1);
    }

    #[test]
    fn test_totals_with_discount() {
        let mut session = BookingSession::new();
        session.set_package(&sample_package());
        session.set_tickets(TicketCounts { adult: 2, child: 1, infant: 1 });
        session.set_applied_discount(Some(AppliedDiscount {
            id: "BUNDLE20".to_string(),
            name: "Package Deal".to_string(),
            description: "Bundle discount".to_string(),
            percentage: 20.0,
            is_automatic: false,
            applied_reason: None,
        }));

        let subtotal = 2.0 * 34.0 + 20.4;
        assert!((session.calculate_subtotal() - subtotal).abs() < 1e-9);
        assert!((session.calculate_total() - subtotal * 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_complete_booking_is_idempotent() {
        let mut session = BookingSession::new();
        let first = session.complete_booking();
        assert!(first.starts_with("BK-"));
        assert!(session.booking_complete);
        assert_eq!(session.current_step, 4);
        assert_eq!(session.complete_booking(), first);
    }

    #[test]
    fn test_ticket_snapshot_requires_completion() {
        let mut session = BookingSession::new();
        session.set_package(&sample_package());
        session.set_date_time(NaiveDate::from_ymd_opt(2027, 6, 1).unwrap(), "10:00");
        session.set_traveler(Traveler {
            name: "Mario".to_string(),
            surname: "Rossi".to_string(),
            phone: "+39 055 123 9876".to_string(),
            email: "Mario@Example.com".to_string(),
        });
        assert!(session.ticket_snapshot().is_none());

        session.complete_booking();
        let ticket = session.ticket_snapshot().unwrap();
        assert_eq!(ticket.user_email, "mario@example.com");
        assert_eq!(ticket.holder_name, "Mario Rossi");
        assert!(matches!(ticket.subject, TicketSubject::Package { .. }));
    }
}
