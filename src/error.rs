//! Error handling for the performance engine
//!
//! Defines the typed errors a calculation can surface and the crate-wide
//! Result alias. The binary wraps these in anyhow for context chaining.

use chrono::NaiveDate;
use thiserror::Error;

use crate::money::format_shares;

/// Errors raised while calculating a performance record
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PerformanceError {
    #[error(
        "oversold inventory on {date}: selling {} shares but only {} available",
        format_shares(*requested),
        format_shares(*available)
    )]
    OversoldInventory {
        date: NaiveDate,
        requested: i64,
        available: i64,
    },

    #[error("IRR did not converge after {iterations} iterations: {reason}")]
    NonConvergence { iterations: usize, reason: String },

    #[error("performance index failed: {0}")]
    ExternalIndexFailure(String),

    #[error("cost per share is undefined when no shares are held")]
    DivisionUndefined,

    #[error("no exchange rate for {currency} on {date}")]
    MissingExchangeRate { currency: String, date: NaiveDate },

    #[error("amount out of range: {0}")]
    AmountOutOfRange(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, PerformanceError>;
