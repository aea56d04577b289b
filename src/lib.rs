//! Booking core for the Voyago tour & travel platform.
//!
//! Covers the multi-step booking sessions (package tours and ancillary
//! services), pricing, discount rules, the persisted ticket ledger, and the
//! catalog API client. Rendering, routing and account handling live in the
//! owning application; this crate only holds the state and the rules.

pub mod db;
pub mod models;
pub mod services;
pub mod store;
