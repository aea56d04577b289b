use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::local::LocalStorage;
use crate::models::discount::{AppliedDiscount, BookingSnapshot};
use crate::models::service::{ServiceOffering, ServiceSelection};
use crate::models::ticket::{NewTicket, TicketSubject};
use crate::models::traveler::{Customer, PaymentInfo};
use crate::services::pricing_service::PricingService;
use crate::store::{MAX_STEP, MIN_STEP, SERVICE_BOOKING_STORAGE_KEY};

pub const DEFAULT_DURATION: &str = "1 hour";

/// Values carried over from the inline quick-booking form on a service page.
/// Only the fields present (and non-blank) overwrite the session.
#[derive(Debug, Clone, Default)]
pub struct QuickBookingPrefill {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub service_type: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedServiceBooking {
    service: Option<ServiceSelection>,
    service_type: Option<String>,
    quantity: u32,
    duration: String,
    selected_date: Option<NaiveDate>,
    selected_time: Option<String>,
    customer: Customer,
    applied_discount: Option<AppliedDiscount>,
}

/// State machine for the four-step service booking wizard (bike rentals,
/// guided tours, transfers). Mirrors the package flow but prices by variant,
/// duration, and quantity instead of ticket tiers.
#[derive(Debug)]
pub struct ServiceBookingSession {
    pub current_step: u8,
    pub service: Option<ServiceSelection>,
    pub service_type: Option<String>,
    pub quantity: u32,
    pub duration: String,
    pub selected_date: Option<NaiveDate>,
    pub selected_time: Option<String>,
    pub customer: Customer,
    pub payment: PaymentInfo,
    pub applied_discount: Option<AppliedDiscount>,
    pub booking_complete: bool,
    pub ref_number: Option<String>,
    storage: Option<LocalStorage>,
}

impl Default for ServiceBookingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceBookingSession {
    pub fn new() -> Self {
        Self {
            current_step: MIN_STEP,
            service: None,
            service_type: None,
            quantity: 1,
            duration: DEFAULT_DURATION.to_string(),
            selected_date: None,
            selected_time: None,
            customer: Customer::default(),
            payment: PaymentInfo::default(),
            applied_discount: None,
            booking_complete: false,
            ref_number: None,
            storage: None,
        }
    }

    pub fn with_storage(storage: LocalStorage) -> Self {
        let mut session = Self::new();
        if let Some(saved) = storage.load::<PersistedServiceBooking>(SERVICE_BOOKING_STORAGE_KEY) {
            session.service = saved.service;
            session.service_type = saved.service_type;
            session.quantity = saved.quantity.max(1);
            session.duration = saved.duration;
            session.selected_date = saved.selected_date;
            session.selected_time = saved.selected_time;
            session.customer = saved.customer;
            session.applied_discount = saved.applied_discount;
        }
        session.storage = Some(storage);
        session
    }

    /// Select a service; any previously chosen variant is dropped since
    /// variants are per-service.
    pub fn set_service(&mut self, service: &ServiceOffering) {
        self.service = Some(ServiceSelection::from(service));
        self.service_type = None;
        self.persist();
    }

    pub fn set_service_type(&mut self, service_type: impl Into<String>) {
        self.service_type = Some(service_type.into());
        self.persist();
    }

    /// Quantity never drops below one.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.max(1);
        self.persist();
    }

    pub fn set_duration(&mut self, duration: impl Into<String>) {
        self.duration = duration.into();
        self.persist();
    }

    pub fn set_date_time(&mut self, date: NaiveDate, time: impl Into<String>) {
        self.selected_date = Some(date);
        self.selected_time = Some(time.into());
        self.persist();
    }

    pub fn set_customer(&mut self, customer: Customer) {
        self.customer = customer;
        self.persist();
    }

    /// Carry quick-booking form values into the wizard; anything the user has
    /// already typed is only replaced when the prefill carries a value.
    pub fn prefill(&mut self, prefill: QuickBookingPrefill) {
        if let Some(name) = prefill.name {
            if !name.trim().is_empty() {
                self.customer.name = name;
            }
        }
        if let Some(email) = prefill.email {
            if !email.trim().is_empty() {
                self.customer.email = email;
            }
        }
        if let Some(phone) = prefill.phone {
            if !phone.trim().is_empty() {
                self.customer.phone = phone;
            }
        }
        if let Some(service_type) = prefill.service_type {
            if !service_type.trim().is_empty() {
                self.service_type = Some(service_type);
            }
        }
        if let Some(date) = prefill.date {
            self.selected_date = Some(date);
        }
        if let Some(time) = prefill.time {
            if !time.trim().is_empty() {
                self.selected_time = Some(time);
            }
        }
        self.persist();
    }

    pub fn set_payment_info(&mut self, payment: PaymentInfo) {
        self.payment = payment;
    }

    pub fn set_applied_discount(&mut self, discount: Option<AppliedDiscount>) {
        self.applied_discount = discount;
        self.persist();
    }

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

    pub fn can_proceed_from(&self, step: u8) -> bool {
        match step {
            1 => {
                self.service.is_some()
                    && self.service_type.is_some()
                    && self.selected_date.is_some()
                    && self.selected_time.is_some()
            }
            2 => self.customer.is_complete(),
            3 => self.payment.is_complete(),
            _ => true,
        }
    }

    pub fn calculate_subtotal(&self) -> f64 {
        let Some(service) = &self.service else {
            return 0.0;
        };
        PricingService::service_subtotal(
            &service.slug,
            self.service_type.as_deref(),
            &self.duration,
            self.quantity,
        )
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

    pub fn complete_booking(&mut self) -> String {
        if self.booking_complete {
            if let Some(existing) = &self.ref_number {
                return existing.clone();
            }
        }
        let ref_number = format!("SV-{}", Utc::now().timestamp_millis());
        self.ref_number = Some(ref_number.clone());
        self.booking_complete = true;
        self.current_step = MAX_STEP;
        ref_number
    }

    /// Group-size rules see the rental quantity as the head count; there are
    /// no child tickets in this flow.
    pub fn discount_snapshot(&self) -> BookingSnapshot {
        BookingSnapshot {
            adult_tickets: self.quantity,
            child_tickets: 0,
            selected_date: self.selected_date,
        }
    }

    pub fn ticket_snapshot(&self) -> Option<NewTicket> {
        if !self.booking_complete {
            return None;
        }
        let service = self.service.as_ref()?;
        let ref_number = self.ref_number.clone()?;
        Some(NewTicket {
            ref_number,
            user_email: self.customer.email.trim().to_lowercase(),
            subject: TicketSubject::Service {
                slug: service.slug.clone(),
                name: service.title_key.clone(),
                service_type: self.service_type.clone(),
                quantity: self.quantity,
                duration: self.duration.clone(),
            },
            date: self.selected_date,
            time: self.selected_time.clone(),
            holder_name: self.customer.name.trim().to_string(),
            subtotal: self.calculate_subtotal(),
            discount_percentage: self.applied_discount.as_ref().map(|d| d.percentage),
            total: self.calculate_total(),
            payment_method: self.payment.masked_label(),
        })
    }

    pub fn reset(&mut self) {
        let storage = self.storage.take();
        *self = Self::new();
        if let Some(storage) = storage {
            storage.remove(SERVICE_BOOKING_STORAGE_KEY);
            self.storage = Some(storage);
        }
    }

    fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let state = PersistedServiceBooking {
            service: self.service.clone(),
            service_type: self.service_type.clone(),
            quantity: self.quantity,
            duration: self.duration.clone(),
            selected_date: self.selected_date,
            selected_time: self.selected_time.clone(),
            customer: self.customer.clone(),
            applied_discount: self.applied_discount.clone(),
        };
        if let Err(err) = storage.save(SERVICE_BOOKING_STORAGE_KEY, &state) {
            log::warn!("Failed to persist service booking state: {}", err);
        }
    }
}
