use regex::Regex;

use crate::models::package::PackageSelection;
use crate::models::traveler::TicketCounts;

/// Per-slug service rates: a base price, an hourly rate for time past the
/// first hour, and per-variant overrides of the base.
#[derive(Debug, Clone)]
pub struct ServiceRates {
    pub base: f64,
    pub per_hour: f64,
    types: &'static [(&'static str, f64)],
}

impl ServiceRates {
    pub fn type_price(&self, service_type: &str) -> Option<f64> {
        self.types
            .iter()
            .find(|(name, _)| *name == service_type)
            .map(|(_, price)| *price)
    }
}

/// Children pay 60% of the adult price, infants travel free.
pub const CHILD_PRICE_RATIO: f64 = 0.6;

pub struct PricingService;

impl PricingService {
    /// Extract the numeric value from a display price string ("€34" -> 34.0).
    /// Unparseable input resolves to 0.
    pub fn parse_display_price(price: &str) -> f64 {
        let re = Regex::new(r"[^0-9.]").unwrap();
        re.replace_all(price, "").parse().unwrap_or(0.0)
    }

    pub fn package_subtotal(tickets: &TicketCounts, package: &PackageSelection) -> f64 {
        f64::from(tickets.adult) * package.adult_price
            + f64::from(tickets.child) * package.child_price
            + f64::from(tickets.infant) * package.infant_price
    }

    /// Rates for a service slug. Unknown slugs fall back to a generic
    /// 25-base / 10-per-hour rate with no variants.
    pub fn rates_for(slug: &str) -> ServiceRates {
        let (base, per_hour, types): (f64, f64, &'static [(&'static str, f64)]) = match slug {
            "bike-rickshaw" => (
                15.0,
                10.0,
                &[("city", 15.0), ("mountain", 20.0), ("electric", 25.0), ("road", 18.0)],
            ),
            "guided-tours" => (
                30.0,
                20.0,
                &[("walking", 25.0), ("bike", 35.0), ("bus", 45.0), ("private", 80.0)],
            ),
            "tuscan-hills" => (
                50.0,
                15.0,
                &[("standard", 50.0), ("premium", 75.0), ("private", 120.0)],
            ),
            "transportation" => (
                40.0,
                25.0,
                &[("shuttle", 25.0), ("minibus", 45.0), ("coach", 60.0)],
            ),
            "luxury-cars" => (
                100.0,
                50.0,
                &[("sedan", 80.0), ("suv", 120.0), ("limousine", 200.0)],
            ),
            "wine-tours" => (
                65.0,
                0.0,
                &[("half_day", 65.0), ("full_day", 110.0), ("premium", 150.0)],
            ),
            _ => (25.0, 10.0, &[]),
        };
        ServiceRates { base, per_hour, types }
    }

    /// Rental duration labels map to a fixed hour count; unknown labels
    /// default to a single hour.
    pub fn duration_hours(label: &str) -> u32 {
        match label {
            "1 hour" => 1,
            "2 hours" => 2,
            "3 hours" => 3,
            "Half day" => 4,
            "Full day" => 8,
            _ => 1,
        }
    }

    /// (variant price + hourly rate for hours past the first) * quantity.
    pub fn service_subtotal(
        slug: &str,
        service_type: Option<&str>,
        duration: &str,
        quantity: u32,
    ) -> f64 {
        let rates = Self::rates_for(slug);
        let unit = service_type
            .and_then(|t| rates.type_price(t))
            .unwrap_or(rates.base);
        let additional_hours = Self::duration_hours(duration).saturating_sub(1);
        (unit + rates.per_hour * f64::from(additional_hours)) * f64::from(quantity)
    }

    /// Final total after a percentage discount, floored at zero.
    pub fn apply_discount(subtotal: f64, percentage: f64) -> f64 {
        (subtotal - subtotal * percentage / 100.0).max(0.0)
    }

    /// Service fee: 5% of the total with a $50 minimum.
    pub fn calculate_service_fee(total: f64) -> f64 {
        (total * 0.05).max(50.0)
    }
}
