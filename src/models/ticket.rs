use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::traveler::TicketCounts;

/// Lifecycle of a ledger entry. Upcoming tickets roll over to Ended once
/// their date passes; cancellation is an explicit user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Upcoming,
    Ended,
    Cancelled,
}

/// Snapshot of what was booked, frozen at completion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TicketSubject {
    Package {
        id: Option<String>,
        name: String,
        tickets: TicketCounts,
    },
    Service {
        slug: String,
        name: String,
        service_type: Option<String>,
        quantity: u32,
        duration: String,
    },
}

/// Everything the ledger needs to mint a ticket. Core fields are immutable
/// once stored; only the status ever changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTicket {
    pub ref_number: String,
    pub user_email: String,
    pub subject: TicketSubject,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub holder_name: String,
    pub subtotal: f64,
    #[serde(default)]
    pub discount_percentage: Option<f64>,
    pub total: f64,
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub booked_at: DateTime<Utc>,
    pub status: TicketStatus,
    #[serde(flatten)]
    pub details: NewTicket,
}
