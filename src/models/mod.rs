pub mod discount;
pub mod package;
pub mod service;
pub mod ticket;
pub mod traveler;
