use std::collections::{HashMap, HashSet};

use chrono::{Local, NaiveDate};

use crate::models::discount::{AppliedDiscount, BookingSnapshot, DiscountSummary, PromoCode};

/// Thresholds for the automatic rules, overridable from the environment.
#[derive(Debug, Clone)]
pub struct AutomaticRuleConfig {
    pub group_min_people: u32,
    pub group_percentage: f64,
    pub early_bird_min_days: i64,
    pub early_bird_percentage: f64,
}

impl Default for AutomaticRuleConfig {
    fn default() -> Self {
        Self {
            group_min_people: 10,
            group_percentage: 25.0,
            early_bird_min_days: 30,
            early_bird_percentage: 15.0,
        }
    }
}

impl AutomaticRuleConfig {
    /// Create thresholds from environment variables or use defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            group_min_people: std::env::var("GROUP_DISCOUNT_MIN_PEOPLE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.group_min_people),
            group_percentage: std::env::var("GROUP_DISCOUNT_PERCENT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.group_percentage),
            early_bird_min_days: std::env::var("EARLY_BIRD_MIN_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.early_bird_min_days),
            early_bird_percentage: std::env::var("EARLY_BIRD_PERCENT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.early_bird_percentage),
        }
    }
}

/// Expected, user-facing outcomes of applying a promo code.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscountError {
    InvalidCode,
    Expired,
    AlreadyRedeemed,
    PreconditionFailed(String),
    /// An automatic discount outranks the requested code; carries the
    /// automatic discount so the UI can say why the code was declined.
    BetterDiscountAvailable(AppliedDiscount),
}

impl std::fmt::Display for DiscountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountError::InvalidCode => write!(f, "Invalid promo code"),
            DiscountError::Expired => write!(f, "This promo code has expired"),
            DiscountError::AlreadyRedeemed => write!(f, "This promo code has already been used"),
            DiscountError::PreconditionFailed(msg) => write!(f, "{}", msg),
            DiscountError::BetterDiscountAvailable(discount) => write!(
                f,
                "You already have a better discount ({}: {}% off)",
                discount.name, discount.percentage
            ),
        }
    }
}

impl std::error::Error for DiscountError {}

/// Evaluates automatic and code-based discounts against a booking snapshot.
///
/// Owns the currently applied promo code; at most one discount is active at a
/// time. Automatic rules are re-checked on every booking-data change, a code
/// discount persists until removed or beaten by a strictly better automatic
/// rule. Codes are not re-validated when booking data changes afterwards.
#[derive(Debug)]
pub struct DiscountService {
    config: AutomaticRuleConfig,
    codes: HashMap<String, PromoCode>,
    applied_promo: Option<AppliedDiscount>,
    applied_discount: Option<AppliedDiscount>,
    redeemed: HashSet<String>,
}

impl Default for DiscountService {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscountService {
    pub fn new() -> Self {
        Self::with_codes(AutomaticRuleConfig::default(), default_promo_codes())
    }

    pub fn from_env() -> Self {
        Self::with_codes(AutomaticRuleConfig::from_env(), default_promo_codes())
    }

    pub fn with_codes(config: AutomaticRuleConfig, codes: Vec<PromoCode>) -> Self {
        let codes = codes
            .into_iter()
            .map(|code| (code.code.to_uppercase(), code))
            .collect();
        Self {
            config,
            codes,
            applied_promo: None,
            applied_discount: None,
            redeemed: HashSet::new(),
        }
    }

    pub fn applied_discount(&self) -> Option<&AppliedDiscount> {
        self.applied_discount.as_ref()
    }

    pub fn applied_promo(&self) -> Option<&AppliedDiscount> {
        self.applied_promo.as_ref()
    }

    /// Evaluate the automatic rules against a snapshot. Group size is checked
    /// first, then early-bird; first match wins, rules never stack.
    pub fn check_automatic(&self, snapshot: &BookingSnapshot) -> Option<AppliedDiscount> {
        let people = snapshot.people();
        if people >= self.config.group_min_people {
            return Some(AppliedDiscount {
                id: "GROUP_DISCOUNT".to_string(),
                name: "Group Discount".to_string(),
                description: format!(
                    "Get {}% off for groups of {} or more people",
                    self.config.group_percentage, self.config.group_min_people
                ),
                percentage: self.config.group_percentage,
                is_automatic: true,
                applied_reason: Some(format!("Group of {} people", people)),
            });
        }

        let today = Local::now().date_naive();
        if let Some(days) = snapshot.days_in_advance(today) {
            if days >= self.config.early_bird_min_days {
                return Some(AppliedDiscount {
                    id: "EARLY_BIRD".to_string(),
                    name: "Early Bird Special".to_string(),
                    description: format!(
                        "Book {} days in advance and save {}%",
                        self.config.early_bird_min_days, self.config.early_bird_percentage
                    ),
                    percentage: self.config.early_bird_percentage,
                    is_automatic: true,
                    applied_reason: Some(format!("Booked {} days in advance", days)),
                });
            }
        }

        None
    }

    /// Re-evaluate automatic rules and update the active discount. A promo
    /// code already applied stays active unless the automatic rule is
    /// strictly better.
    pub fn apply_automatic(&mut self, snapshot: &BookingSnapshot) -> Option<AppliedDiscount> {
        let automatic = self.check_automatic(snapshot);

        if let Some(discount) = automatic {
            let promo_is_better = self
                .applied_promo
                .as_ref()
                .is_some_and(|promo| promo.percentage >= discount.percentage);
            if !promo_is_better {
                self.applied_discount = Some(discount.clone());
                return Some(discount);
            }
        }

        if let Some(promo) = self.applied_promo.clone() {
            self.applied_discount = Some(promo.clone());
            return Some(promo);
        }

        self.applied_discount = None;
        None
    }

    /// Apply a promo code. Lookup is case-insensitive; the code is refused if
    /// unknown, expired, already redeemed (single-use), its structural
    /// precondition fails, or an automatic discount is strictly better.
    pub fn apply_code(
        &mut self,
        code: &str,
        snapshot: &BookingSnapshot,
    ) -> Result<AppliedDiscount, DiscountError> {
        let key = code.trim().to_uppercase();
        let promo = self.codes.get(&key).cloned().ok_or(DiscountError::InvalidCode)?;

        if let Some(valid_until) = promo.valid_until {
            if Local::now().date_naive() >= valid_until {
                return Err(DiscountError::Expired);
            }
        }

        if promo.single_use && self.redeemed.contains(&key) {
            return Err(DiscountError::AlreadyRedeemed);
        }

        if promo.requires_child && snapshot.child_tickets == 0 {
            return Err(DiscountError::PreconditionFailed(
                "This code requires at least one child ticket".to_string(),
            ));
        }

        if let Some(automatic) = self.check_automatic(snapshot) {
            if automatic.percentage > promo.percentage {
                self.applied_promo = None;
                self.applied_discount = Some(automatic.clone());
                return Err(DiscountError::BetterDiscountAvailable(automatic));
            }
        }

        let applied = promo.to_applied();
        self.applied_promo = Some(applied.clone());
        self.applied_discount = Some(applied.clone());
        Ok(applied)
    }

    /// Drop the code discount and fall back to whatever automatic rule now
    /// applies, if any.
    pub fn remove_code(&mut self, snapshot: &BookingSnapshot) -> Option<AppliedDiscount> {
        self.applied_promo = None;
        let automatic = self.check_automatic(snapshot);
        self.applied_discount = automatic.clone();
        automatic
    }

    /// Record a single-use code as spent. Called when a booking completes.
    pub fn mark_redeemed(&mut self, code: &str) {
        self.redeemed.insert(code.trim().to_uppercase());
    }

    pub fn discount_amount(&self, subtotal: f64) -> f64 {
        match &self.applied_discount {
            Some(discount) => subtotal * discount.percentage / 100.0,
            None => 0.0,
        }
    }

    /// Subtotal minus the active discount, floored at zero.
    pub fn final_price(&self, subtotal: f64) -> f64 {
        (subtotal - self.discount_amount(subtotal)).max(0.0)
    }

    pub fn discount_summary(&self, subtotal: f64) -> Option<DiscountSummary> {
        let discount = self.applied_discount.as_ref()?;
        Some(DiscountSummary {
            name: discount.name.clone(),
            percentage: discount.percentage,
            reason: discount
                .applied_reason
                .clone()
                .unwrap_or_else(|| discount.description.clone()),
            discount_amount: self.discount_amount(subtotal),
            final_price: self.final_price(subtotal),
            is_automatic: discount.is_automatic,
        })
    }

    pub fn clear(&mut self) {
        self.applied_promo = None;
        self.applied_discount = None;
    }
}

/// The fixed promo code table from the marketing campaigns.
pub fn default_promo_codes() -> Vec<PromoCode> {
    vec![
        PromoCode {
            code: "WELCOME10".to_string(),
            name: "Welcome Discount".to_string(),
            description: "Welcome discount for new customers".to_string(),
            percentage: 10.0,
            valid_until: None,
            requires_child: false,
            single_use: true,
        },
        PromoCode {
            code: "SUMMER25".to_string(),
            name: "Summer Special".to_string(),
            description: "Summer special discount".to_string(),
            percentage: 25.0,
            valid_until: NaiveDate::from_ymd_opt(2025, 9, 1),
            requires_child: false,
            single_use: false,
        },
        PromoCode {
            code: "BUNDLE20".to_string(),
            name: "Package Deal".to_string(),
            description: "Bundle discount for multiple bookings".to_string(),
            percentage: 20.0,
            valid_until: None,
            requires_child: false,
            single_use: false,
        },
        PromoCode {
            code: "FAMILY15".to_string(),
            name: "Family Discount".to_string(),
            description: "Family discount for bookings with children".to_string(),
            percentage: 15.0,
            valid_until: None,
            requires_child: true,
            single_use: false,
        },
        PromoCode {
            code: "VOYAGO30".to_string(),
            name: "VIP Discount".to_string(),
            description: "Exclusive VIP discount".to_string(),
            percentage: 30.0,
            valid_until: None,
            requires_child: false,
            single_use: false,
        },
    ]
}
