use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A discount currently attached to a booking. At most one is active at any
/// time; applying a new one replaces the old, they never stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub id: String,
    pub name: String,
    pub description: String,
    pub percentage: f64,
    pub is_automatic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_reason: Option<String>,
}

/// Entry in the promo code table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoCode {
    pub code: String,
    pub name: String,
    pub description: String,
    pub percentage: f64,
    /// Expired once the local date reaches this day.
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    /// Requires at least one child ticket on the booking.
    #[serde(default)]
    pub requires_child: bool,
    #[serde(default)]
    pub single_use: bool,
}

impl PromoCode {
    pub fn to_applied(&self) -> AppliedDiscount {
        AppliedDiscount {
            id: self.code.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            percentage: self.percentage,
            is_automatic: false,
            applied_reason: None,
        }
    }
}

/// The slice of booking data the discount rules look at.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BookingSnapshot {
    pub adult_tickets: u32,
    pub child_tickets: u32,
    pub selected_date: Option<NaiveDate>,
}

impl BookingSnapshot {
    /// Group-size rules count adults and children, not infants.
    pub fn people(&self) -> u32 {
        self.adult_tickets + self.child_tickets
    }

    /// Whole days between today and the booked date, at midnight granularity.
    pub fn days_in_advance(&self, today: NaiveDate) -> Option<i64> {
        self.selected_date.map(|date| (date - today).num_days())
    }
}

/// Breakdown handed to the UI for the price summary box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscountSummary {
    pub name: String,
    pub percentage: f64,
    pub reason: String,
    pub discount_amount: f64,
    pub final_price: f64,
    pub is_automatic: bool,
}
