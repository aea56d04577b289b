use std::collections::HashMap;

use chrono::{Datelike, Local};
use regex::Regex;

use crate::models::traveler::{PaymentInfo, Traveler};

/// Outcome of a single field check. These are form-level format checks; the
/// booking sessions themselves only test presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheck {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl FieldCheck {
    fn ok() -> Self {
        Self { is_valid: true, error: None }
    }

    fn fail(error: impl Into<String>) -> Self {
        Self { is_valid: false, error: Some(error.into()) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardType {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Diners,
    Jcb,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardCheck {
    pub is_valid: bool,
    pub error: Option<String>,
    pub card_type: CardType,
    /// Digits regrouped in blocks of four for display.
    pub formatted: Option<String>,
}

/// Per-field errors for a whole form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormCheck {
    pub is_valid: bool,
    pub errors: HashMap<&'static str, String>,
}

const DISPOSABLE_DOMAINS: &[&str] = &[
    "tempmail.com",
    "throwaway.com",
    "guerrillamail.com",
    "mailinator.com",
    "10minutemail.com",
    "temp-mail.org",
    "yopmail.com",
];

const DOMAIN_TYPOS: &[(&str, &str)] = &[
    ("gmial.com", "gmail.com"),
    ("gamil.com", "gmail.com"),
    ("gmail.con", "gmail.com"),
    ("gmail.co", "gmail.com"),
    ("hotmial.com", "hotmail.com"),
    ("hotmail.con", "hotmail.com"),
    ("yaho.com", "yahoo.com"),
    ("yahooo.com", "yahoo.com"),
    ("outlok.com", "outlook.com"),
    ("outlook.con", "outlook.com"),
];

pub fn validate_email(email: &str) -> FieldCheck {
    let email = email.trim().to_lowercase();

    if email.is_empty() {
        return FieldCheck::fail("Email is required");
    }
    if email.len() < 5 {
        return FieldCheck::fail("Email is too short");
    }
    if email.len() > 254 {
        return FieldCheck::fail("Email is too long");
    }
    if email.contains(' ') {
        return FieldCheck::fail("Email cannot contain spaces");
    }

    if email.matches('@').count() != 1 {
        return FieldCheck::fail("Email must contain exactly one @ symbol");
    }
    let (local, domain) = email.split_once('@').unwrap_or(("", ""));

    if local.is_empty() {
        return FieldCheck::fail("Email username is required before @");
    }
    if local.len() > 64 {
        return FieldCheck::fail("Email username is too long");
    }
    if local.starts_with('.') || local.ends_with('.') {
        return FieldCheck::fail("Email cannot start or end with a dot");
    }
    if local.contains("..") {
        return FieldCheck::fail("Email cannot contain consecutive dots");
    }

    if domain.len() < 3 || !domain.contains('.') {
        return FieldCheck::fail("Email domain must include a dot (e.g., .com)");
    }
    if domain.starts_with('.') || domain.ends_with('.') || domain.starts_with('-') || domain.ends_with('-') {
        return FieldCheck::fail("Invalid email domain format");
    }
    let tld = domain.rsplit('.').next().unwrap_or("");
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return FieldCheck::fail("Email must have a valid domain extension (e.g., .com, .org)");
    }

    let re = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .unwrap();
    if !re.is_match(&email) {
        return FieldCheck::fail("Please enter a valid email address");
    }

    if let Some((_, correct)) = DOMAIN_TYPOS.iter().find(|(typo, _)| *typo == domain) {
        return FieldCheck::fail(format!("Did you mean {}@{}?", local, correct));
    }
    if DISPOSABLE_DOMAINS.contains(&domain) {
        return FieldCheck::fail("Please use a permanent email address");
    }

    FieldCheck::ok()
}

pub fn validate_name(name: &str, field_name: &str) -> FieldCheck {
    let name = name.trim();

    if name.is_empty() {
        return FieldCheck::fail(format!("{} is required", field_name));
    }
    if name.chars().count() < 2 {
        return FieldCheck::fail(format!("{} must be at least 2 characters", field_name));
    }
    if name.chars().count() > 50 {
        return FieldCheck::fail(format!("{} must be less than 50 characters", field_name));
    }

    let valid = name
        .chars()
        .all(|c| c.is_alphabetic() || c.is_whitespace() || c == '\'' || c == '-');
    if !valid {
        return FieldCheck::fail(format!("{} contains invalid characters", field_name));
    }

    // Four or more of the same character in a row is keyboard mashing
    let mashing = Regex::new(r"(.)\1{3,}").unwrap();
    if mashing.is_match(name) {
        return FieldCheck::fail(format!("{} contains invalid repeated characters", field_name));
    }

    FieldCheck::ok()
}

pub fn validate_phone(phone: &str) -> FieldCheck {
    let phone = phone.trim();

    if phone.is_empty() {
        return FieldCheck::fail("Phone number is required");
    }

    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return FieldCheck::fail("Phone number must contain digits");
    }
    if digits.len() < 7 {
        return FieldCheck::fail("Phone number must be at least 7 digits");
    }
    // ITU-T E.164 maximum
    if digits.len() > 15 {
        return FieldCheck::fail("Phone number cannot exceed 15 digits");
    }

    let all_same = digits.chars().all(|c| c == digits.chars().next().unwrap_or('0'));
    let sequential = "01234567890123456789".contains(&digits)
        || "98765432109876543210".contains(&digits);
    if all_same || sequential || digits.starts_with("123456") || digits.starts_with("000000") {
        return FieldCheck::fail("Please enter a valid phone number");
    }

    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || " -().+".contains(c));
    if !allowed {
        return FieldCheck::fail("Phone number contains invalid characters");
    }

    FieldCheck::ok()
}

pub fn validate_card_number(card_number: &str) -> CardCheck {
    let digits: String = card_number.chars().filter(|c| c.is_ascii_digit()).collect();

    let fail = |error: &str, card_type: CardType| CardCheck {
        is_valid: false,
        error: Some(error.to_string()),
        card_type,
        formatted: None,
    };

    if digits.is_empty() {
        return fail("Card number is required", CardType::Unknown);
    }
    if digits.len() < 13 {
        return fail("Card number is too short", CardType::Unknown);
    }
    if digits.len() > 19 {
        return fail("Card number is too long", CardType::Unknown);
    }

    let card_type = detect_card_type(&digits);

    if !luhn_check(&digits) {
        return fail("Invalid card number", card_type);
    }

    CardCheck {
        is_valid: true,
        error: None,
        card_type,
        formatted: Some(format_card_number(&digits)),
    }
}

fn luhn_check(digits: &str) -> bool {
    let mut sum = 0u32;
    let mut double = false;

    for c in digits.chars().rev() {
        let mut digit = c.to_digit(10).unwrap_or(0);
        if double {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
        double = !double;
    }

    sum % 10 == 0
}

fn detect_card_type(digits: &str) -> CardType {
    let patterns: &[(CardType, &str)] = &[
        (CardType::Visa, r"^4"),
        (CardType::Mastercard, r"^5[1-5]|^2[2-7]"),
        (CardType::Amex, r"^3[47]"),
        (CardType::Discover, r"^6(?:011|5)"),
        (CardType::Diners, r"^3(?:0[0-5]|[68])"),
        (CardType::Jcb, r"^(?:2131|1800|35)"),
    ];

    for (card_type, pattern) in patterns {
        if Regex::new(pattern).unwrap().is_match(digits) {
            return *card_type;
        }
    }
    CardType::Unknown
}

fn format_card_number(digits: &str) -> String {
    digits
        .as_bytes()
        .chunks(4)
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_expiry_date(expiry: &str) -> FieldCheck {
    let digits: String = expiry.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() < 3 || digits.len() > 4 {
        return FieldCheck::fail("Enter expiry as MM/YY");
    }

    // "122" reads as 1/22, "1225" as 12/25
    let (month_part, year_part) = if digits.len() == 3 {
        digits.split_at(1)
    } else {
        digits.split_at(2)
    };
    let month: u32 = month_part.parse().unwrap_or(0);
    let year: i32 = year_part.parse().unwrap_or(0);

    if !(1..=12).contains(&month) {
        return FieldCheck::fail("Invalid month (01-12)");
    }

    let now = Local::now();
    let full_year = if year < 100 { year + 2000 } else { year };
    let current_year = now.year();
    let current_month = now.month();

    if full_year < current_year || (full_year == current_year && month < current_month) {
        return FieldCheck::fail("Card has expired");
    }
    if full_year > current_year + 10 {
        return FieldCheck::fail("Invalid expiry year");
    }

    FieldCheck::ok()
}

pub fn validate_cvv(cvv: &str, card_type: CardType) -> FieldCheck {
    let digits: String = cvv.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return FieldCheck::fail("CVV is required");
    }
    if digits.len() < 3 {
        return FieldCheck::fail("CVV is too short");
    }
    if digits.len() > 4 {
        return FieldCheck::fail("CVV is too long");
    }

    // Amex uses 4 digits, every other brand 3
    let expected = if card_type == CardType::Amex { 4 } else { 3 };
    if card_type != CardType::Unknown && digits.len() != expected {
        return FieldCheck::fail(format!("CVV should be {} digits for this card", expected));
    }

    FieldCheck::ok()
}

pub fn validate_card_holder(name: &str) -> FieldCheck {
    let name = name.trim().to_uppercase();

    if name.is_empty() {
        return FieldCheck::fail("Card holder name is required");
    }
    if name.len() < 3 {
        return FieldCheck::fail("Card holder name is too short");
    }
    if name.len() > 26 {
        return FieldCheck::fail("Card holder name is too long (max 26 characters)");
    }

    let valid = name
        .chars()
        .all(|c| c.is_ascii_uppercase() || c == ' ' || c == '-' || c == '.' || c == '\'');
    if !valid {
        return FieldCheck::fail("Card holder name contains invalid characters");
    }

    if name.split_whitespace().count() < 2 {
        return FieldCheck::fail("Please enter first and last name");
    }

    FieldCheck::ok()
}

pub fn validate_traveler_form(traveler: &Traveler) -> FormCheck {
    let mut errors = HashMap::new();

    let check = validate_name(&traveler.name, "First name");
    if let Some(error) = check.error {
        errors.insert("name", error);
    }
    let check = validate_name(&traveler.surname, "Last name");
    if let Some(error) = check.error {
        errors.insert("surname", error);
    }
    let check = validate_phone(&traveler.phone);
    if let Some(error) = check.error {
        errors.insert("phone", error);
    }
    let check = validate_email(&traveler.email);
    if let Some(error) = check.error {
        errors.insert("email", error);
    }

    FormCheck { is_valid: errors.is_empty(), errors }
}

pub fn validate_payment_form(payment: &PaymentInfo) -> (FormCheck, CardType) {
    let mut errors = HashMap::new();

    let card = validate_card_number(&payment.card_number);
    if let Some(error) = &card.error {
        errors.insert("card_number", error.clone());
    }
    let check = validate_card_holder(&payment.card_holder);
    if let Some(error) = check.error {
        errors.insert("card_holder", error);
    }
    let check = validate_expiry_date(&payment.expiry_date);
    if let Some(error) = check.error {
        errors.insert("expiry_date", error);
    }
    let check = validate_cvv(&payment.cvv, card.card_type);
    if let Some(error) = check.error {
        errors.insert("cvv", error);
    }

    (FormCheck { is_valid: errors.is_empty(), errors }, card.card_type)
}
