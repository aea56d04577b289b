use serde::{Deserialize, Serialize};

/// Ticket counts for a package booking. Child tickets are priced at 60% of
/// the adult price, infants travel free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketCounts {
    pub adult: u32,
    pub child: u32,
    pub infant: u32,
}

impl Default for TicketCounts {
    fn default() -> Self {
        Self {
            adult: 1,
            child: 0,
            infant: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketKind {
    Adult,
    Child,
    Infant,
}

/// Traveler details collected on step 2 of the package flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traveler {
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub email: String,
}

impl Traveler {
    /// Presence-only check; format validation is owned by the form layer.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.surname.trim().is_empty()
            && !self.phone.trim().is_empty()
            && !self.email.trim().is_empty()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name.trim(), self.surname.trim())
            .trim()
            .to_string()
    }
}

/// Customer details collected on step 2 of the service flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Customer {
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.phone.trim().is_empty()
    }
}

/// Card details collected on step 3. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub card_number: String,
    pub card_holder: String,
    pub expiry_date: String,
    pub cvv: String,
}

impl PaymentInfo {
    pub fn is_complete(&self) -> bool {
        !self.card_number.trim().is_empty()
            && !self.card_holder.trim().is_empty()
            && !self.expiry_date.trim().is_empty()
            && !self.cvv.trim().is_empty()
    }

    /// Display label for the ticket ledger, e.g. "card •••• 4242".
    pub fn masked_label(&self) -> String {
        let digits: String = self.card_number.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() >= 4 {
            format!("card •••• {}", &digits[digits.len() - 4..])
        } else {
            "card".to_string()
        }
    }
}
