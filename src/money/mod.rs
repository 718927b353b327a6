//! Exact monetary values and share quantities
//!
//! Amounts are integers in minor units (cents) and share quantities are
//! integers scaled by [`SHARE_FACTOR`]. Decimal is only used at the edges:
//! when parsing input and when applying an exchange rate.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{PerformanceError, Result};

pub mod converter;

pub use converter::{CurrencyConverter, RateTable};

/// Minor units per currency unit
pub const AMOUNT_FACTOR: i64 = 100;
/// Scale of share quantities (10^8)
pub const SHARE_FACTOR: i64 = 100_000_000;

const AMOUNT_SCALE: u32 = 2;
const SHARE_SCALE: u32 = 8;

/// Monetary value tagged with its ISO currency code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    currency: String,
    amount: i64,
}

impl Money {
    pub fn of(currency: impl Into<String>, amount: i64) -> Self {
        Self {
            currency: currency.into(),
            amount,
        }
    }

    pub fn zero(currency: impl Into<String>) -> Self {
        Self::of(currency, 0)
    }

    /// Build from a decimal in currency units, rounding half away from zero
    /// to the nearest minor unit.
    pub fn from_decimal(currency: impl Into<String>, value: Decimal) -> Result<Self> {
        let amount = round_to_i64(value * Decimal::from(AMOUNT_FACTOR))?;
        Ok(Self::of(currency, amount))
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Amount in minor units
    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.amount, AMOUNT_SCALE)
    }

    /// Same currency, different amount
    pub fn with_amount(&self, amount: i64) -> Self {
        Self::of(self.currency.clone(), amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.currency, self.to_decimal())
    }
}

/// Parse a decimal share quantity into scaled integer shares
pub fn shares_from_decimal(value: Decimal) -> Result<i64> {
    round_to_i64(value * Decimal::from(SHARE_FACTOR))
}

pub fn shares_to_decimal(shares: i64) -> Decimal {
    Decimal::new(shares, SHARE_SCALE).normalize()
}

/// Scaled shares rendered without trailing zeros ("12", "0.5")
pub fn format_shares(shares: i64) -> String {
    shares_to_decimal(shares).to_string()
}

pub(crate) fn round_to_i64(value: Decimal) -> Result<i64> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| PerformanceError::AmountOutOfRange(value.to_string()))
}
