//! # Pricing Engine
//!
//! Pure functions: cost breakdown, limit/balance checks and customer
//! field checks. Amounts stay `f64` until they are formatted; rounding to
//! whole credits only happens in [`credits`].
//!
//! ```text
//! base      = daily_rate * days
//! insurance = insured ? base * 0.15 : 0
//! tax       = (base + insurance) * 0.10
//! total     = base + insurance + tax
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

pub const INSURANCE_RATE: f64 = 0.15;
pub const TAX_RATE: f64 = 0.10;

pub const MIN_RENTAL_DAYS: u8 = 1;
pub const MAX_RENTAL_DAYS: u8 = 7;

pub const MIN_DRIVER_AGE: u8 = 18;
pub const MAX_DRIVER_AGE: u8 = 80;
pub const DEFAULT_DRIVER_AGE: u8 = 25;

pub const MIN_PHONE_LENGTH: usize = 10;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9+._%\-]{1,256}@[a-zA-Z0-9][a-zA-Z0-9\-]{0,64}(\.[a-zA-Z0-9][a-zA-Z0-9\-]{0,25})+$",
    )
    .expect("email pattern is valid")
});

// ============================================================================
// Rental Days
// ============================================================================

/// A day count in `1..=7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RentalDays(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDays(pub u8);

impl fmt::Display for InvalidDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rental days must be between {MIN_RENTAL_DAYS} and {MAX_RENTAL_DAYS}, got {}",
            self.0
        )
    }
}

impl std::error::Error for InvalidDays {}

impl RentalDays {
    pub fn new(days: u8) -> Result<Self, InvalidDays> {
        if (MIN_RENTAL_DAYS..=MAX_RENTAL_DAYS).contains(&days) {
            Ok(Self(days))
        } else {
            Err(InvalidDays(days))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for RentalDays {
    fn default() -> Self {
        Self(MIN_RENTAL_DAYS)
    }
}

impl TryFrom<u8> for RentalDays {
    type Error = InvalidDays;

    fn try_from(days: u8) -> Result<Self, Self::Error> {
        Self::new(days)
    }
}

impl From<RentalDays> for u8 {
    fn from(days: RentalDays) -> Self {
        days.0
    }
}

impl fmt::Display for RentalDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Quote
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookingQuote {
    pub base_cost: f64,
    pub insurance_cost: f64,
    pub tax: f64,
    pub total: f64,
}

pub fn quote(daily_rate: f64, days: RentalDays, insurance_selected: bool) -> BookingQuote {
    let base_cost = daily_rate * f64::from(days.get());
    let insurance_cost = if insurance_selected {
        base_cost * INSURANCE_RATE
    } else {
        0.0
    };
    let tax = (base_cost + insurance_cost) * TAX_RATE;
    BookingQuote {
        base_cost,
        insurance_cost,
        tax,
        total: base_cost + insurance_cost + tax,
    }
}

/// Whole credits for display: 170.775 -> 171.
pub fn round_credits(amount: f64) -> i64 {
    amount.round() as i64
}

/// "171 credits"
pub fn credits(amount: f64) -> String {
    format!("{} credits", round_credits(amount))
}

// ============================================================================
// Validation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CustomerField {
    Name,
    Email,
    Phone,
    License,
    Age,
}

/// A failed check. Customer field errors come first, then the rental
/// limit, then the balance.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    InvalidField {
        field: CustomerField,
        message: &'static str,
    },
    ExceedsRentalLimit {
        total: f64,
        limit: f64,
        excess: f64,
    },
    InsufficientBalance {
        total: f64,
        balance: f64,
        shortfall: f64,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidField { message, .. } => write!(f, "{message}"),
            ValidationError::ExceedsRentalLimit { total, limit, .. } => write!(
                f,
                "The total cost ({}) exceeds the maximum rental limit of {} per booking. \
                 Please reduce the number of days or remove insurance.",
                credits(*total),
                credits(*limit)
            ),
            ValidationError::InsufficientBalance {
                total,
                balance,
                shortfall,
            } => write!(
                f,
                "Your current balance ({}) is insufficient. Total cost: {}, shortfall: {}. \
                 Please reduce the rental duration or remove insurance.",
                credits(*balance),
                credits(*total),
                credits(*shortfall)
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

/// Limit first, then balance.
pub fn validate(quote: &BookingQuote, balance: f64, max_rental_limit: f64) -> ValidationResult {
    if quote.total > max_rental_limit {
        return Err(ValidationError::ExceedsRentalLimit {
            total: quote.total,
            limit: max_rental_limit,
            excess: quote.total - max_rental_limit,
        });
    }
    if quote.total > balance {
        return Err(ValidationError::InsufficientBalance {
            total: quote.total,
            balance,
            shortfall: quote.total - balance,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub license: String,
    pub age: u8,
}

impl Default for CustomerDetails {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            license: String::new(),
            age: DEFAULT_DRIVER_AGE,
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Checks fields in form order and stops at the first failure.
pub fn validate_customer(customer: &CustomerDetails) -> ValidationResult {
    let invalid = |field: CustomerField, message: &'static str| -> ValidationResult {
        Err(ValidationError::InvalidField { field, message })
    };

    if customer.name.trim().is_empty() {
        return invalid(CustomerField::Name, "Name is required");
    }
    let email = customer.email.trim();
    if email.is_empty() || !is_valid_email(email) {
        return invalid(CustomerField::Email, "Valid email is required");
    }
    if customer.phone.trim().chars().count() < MIN_PHONE_LENGTH {
        return invalid(
            CustomerField::Phone,
            "Valid phone number is required (min 10 digits)",
        );
    }
    if customer.license.trim().is_empty() {
        return invalid(CustomerField::License, "Driver license number is required");
    }
    if !(MIN_DRIVER_AGE..=MAX_DRIVER_AGE).contains(&customer.age) {
        return invalid(CustomerField::Age, "Driver must be between 18 and 80 years old");
    }
    Ok(())
}

// ============================================================================
// Presentation text
// ============================================================================

/// The price summary shown beside the booking form.
pub fn price_breakdown(
    quote: &BookingQuote,
    days: RentalDays,
    insurance_selected: bool,
    balance: f64,
    max_rental_limit: f64,
) -> String {
    let mut lines = vec![
        "Price Breakdown:".to_string(),
        format!("Base cost ({days} day(s)): {}", credits(quote.base_cost)),
    ];
    if insurance_selected {
        lines.push(format!("Insurance (15%): {}", credits(quote.insurance_cost)));
    }
    lines.push(format!("Tax (10%): {}", credits(quote.tax)));
    lines.push("━━━━━━━━━━━━━━━━━━━".to_string());
    lines.push(format!("Total: {}", credits(quote.total)));
    lines.push(String::new());
    lines.push(format!("Your Balance: {}", credits(balance)));

    let warning = match validate(quote, balance, max_rental_limit) {
        Err(ValidationError::ExceedsRentalLimit { limit, .. }) => Some(format!(
            "WARNING: Total exceeds max rental limit of {}!",
            credits(limit)
        )),
        Err(ValidationError::InsufficientBalance { .. }) => {
            Some("WARNING: Insufficient balance!".to_string())
        }
        _ => None,
    };
    if let Some(warning) = warning {
        lines.push(String::new());
        lines.push(warning);
    }
    lines.join("\n")
}
