// 💳 Credit Card - billing cycle parameters and limit
//
// A card owns nothing: transactions point at it by id. Its closing and due
// days are day-of-month numbers; the cycle engine turns them into dates.

use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Valid range for closing/due days
pub const BILLING_DAYS: std::ops::RangeInclusive<u32> = 1..=31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", from = "String")]
pub enum Brand {
    Visa,
    Mastercard,
    Elo,
    AmericanExpress,
    Other,
}

impl From<String> for Brand {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "visa" => Brand::Visa,
            "mastercard" | "master" => Brand::Mastercard,
            "elo" => Brand::Elo,
            "american-express" | "american express" | "amex" => Brand::AmericanExpress,
            _ => Brand::Other,
        }
    }
}

impl Brand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Brand::Visa => "Visa",
            Brand::Mastercard => "Mastercard",
            Brand::Elo => "Elo",
            Brand::AmericanExpress => "American Express",
            Brand::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: String,

    pub name: String,

    pub brand: Brand,

    pub last_four_digits: String,

    /// Day of month the statement closes (1..=31, clamped in short months)
    pub closing_day: u32,

    /// Day of month the bill is due (1..=31, clamped in short months)
    pub due_day: u32,

    #[serde(with = "rust_decimal::serde::str")]
    pub credit_limit: Decimal,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CreditCard {
    /// Create a card, checking the billing days and limit
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        brand: Brand,
        last_four_digits: impl Into<String>,
        closing_day: u32,
        due_day: u32,
        credit_limit: Decimal,
    ) -> Result<Self> {
        let card = CreditCard {
            id: id.into(),
            name: name.into(),
            brand,
            last_four_digits: last_four_digits.into(),
            closing_day,
            due_day,
            credit_limit,
            is_active: true,
        };
        card.validate()?;
        Ok(card)
    }

    /// Check closing/due days are within 1..=31
    pub fn validate_cycle(&self) -> Result<()> {
        if BILLING_DAYS.contains(&self.closing_day) && BILLING_DAYS.contains(&self.due_day) {
            Ok(())
        } else {
            Err(LedgerError::InvalidCycleConfig {
                card_id: self.id.clone(),
                closing_day: self.closing_day,
                due_day: self.due_day,
            })
        }
    }

    /// Full invariant check: billing days and a non-negative limit
    pub fn validate(&self) -> Result<()> {
        self.validate_cycle()?;
        if self.credit_limit < Decimal::ZERO {
            return Err(LedgerError::invalid_record(
                &self.id,
                "credit limit cannot be negative",
            ));
        }
        Ok(())
    }

    /// "**** 1234"
    pub fn masked_number(&self) -> String {
        let digits = self.last_four_digits.trim();
        let tail = match digits.char_indices().rev().nth(3) {
            Some((start, _)) => &digits[start..],
            None => digits,
        };
        format!("**** {}", tail)
    }

    /// Same card, deactivated
    pub fn deactivated(self) -> Self {
        CreditCard {
            is_active: false,
            ..self
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
