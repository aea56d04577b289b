pub mod booking_session;
pub mod service_session;
pub mod ticket_ledger;

/// Wizard step bounds shared by both booking flows.
pub const MIN_STEP: u8 = 1;
pub const MAX_STEP: u8 = 4;

pub const BOOKING_STORAGE_KEY: &str = "booking-storage";
pub const SERVICE_BOOKING_STORAGE_KEY: &str = "service-booking-storage";
pub const USER_TICKETS_STORAGE_KEY: &str = "user-tickets-storage";
