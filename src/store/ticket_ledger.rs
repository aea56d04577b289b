use chrono::{Local, Utc};

use crate::db::local::LocalStorage;
use crate::models::ticket::{NewTicket, Ticket, TicketStatus};
use crate::store::USER_TICKETS_STORAGE_KEY;

/// What happened when a ticket was added to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added(Ticket),
    /// A ticket with the same reference number is already stored; the ledger
    /// is left untouched.
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    AlreadyCancelled,
    /// Past tickets cannot be cancelled.
    AlreadyEnded,
    NotFound,
}

/// Persisted list of purchased tickets, newest first. Tickets are append-only
/// apart from status transitions (upcoming -> ended / cancelled).
#[derive(Debug)]
pub struct TicketLedger {
    tickets: Vec<Ticket>,
    storage: Option<LocalStorage>,
}

impl Default for TicketLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketLedger {
    pub fn new() -> Self {
        Self { tickets: Vec::new(), storage: None }
    }

    pub fn with_storage(storage: LocalStorage) -> Self {
        let tickets = storage
            .load::<Vec<Ticket>>(USER_TICKETS_STORAGE_KEY)
            .unwrap_or_default();
        Self { tickets, storage: Some(storage) }
    }

    /// Mint a ticket from a completed booking. Duplicate reference numbers
    /// are refused so replaying a completion cannot double-book.
    pub fn add(&mut self, details: NewTicket) -> AddOutcome {
        if self.tickets.iter().any(|t| t.details.ref_number == details.ref_number) {
            log::info!(
                "Ignoring duplicate ticket for booking {}",
                details.ref_number
            );
            return AddOutcome::AlreadyExists;
        }

        let ticket = Ticket {
            id: self.unique_id(),
            booked_at: Utc::now(),
            status: TicketStatus::Upcoming,
            details,
        };
        self.tickets.insert(0, ticket.clone());
        self.persist();
        AddOutcome::Added(ticket)
    }

    /// Roll upcoming tickets whose date has passed over to ended. Tickets
    /// booked for today stay upcoming until the day is over.
    pub fn update_past_tickets(&mut self) {
        let today = Local::now().date_naive();
        let mut changed = false;
        for ticket in &mut self.tickets {
            if ticket.status == TicketStatus::Upcoming
                && ticket.details.date.is_some_and(|date| date < today)
            {
                ticket.status = TicketStatus::Ended;
                changed = true;
            }
        }
        if changed {
            self.persist();
        }
    }

    /// Tickets for one account, matched on the lowercased email. Statuses are
    /// refreshed first so the caller never sees a stale "upcoming".
    pub fn tickets_for(&mut self, email: &str) -> Vec<Ticket> {
        self.update_past_tickets();
        let email = email.trim().to_lowercase();
        self.tickets
            .iter()
            .filter(|t| t.details.user_email == email)
            .cloned()
            .collect()
    }

    pub fn cancel(&mut self, ticket_id: &str) -> CancelOutcome {
        let Some(ticket) = self.tickets.iter_mut().find(|t| t.id == ticket_id) else {
            return CancelOutcome::NotFound;
        };
        match ticket.status {
            TicketStatus::Cancelled => CancelOutcome::AlreadyCancelled,
            TicketStatus::Ended => CancelOutcome::AlreadyEnded,
            TicketStatus::Upcoming => {
                ticket.status = TicketStatus::Cancelled;
                self.persist();
                CancelOutcome::Cancelled
            }
        }
    }

    pub fn all(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn clear(&mut self) {
        self.tickets.clear();
        if let Some(storage) = &self.storage {
            storage.remove(USER_TICKETS_STORAGE_KEY);
        }
    }

    // Millisecond ids collide when two tickets land in the same tick; bump
    // until free.
    fn unique_id(&self) -> String {
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let id = format!("TKT-{}", millis);
            if !self.tickets.iter().any(|t| t.id == id) {
                return id;
            }
            millis += 1;
        }
    }

    fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        if let Err(err) = storage.save(USER_TICKETS_STORAGE_KEY, &self.tickets) {
            log::warn!("Failed to persist tickets: {}", err);
        }
    }
}
