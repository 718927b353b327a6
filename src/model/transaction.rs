use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::money::Money;

/// Kind of economic event against a security
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Buy,
    Sell,
    InboundDelivery,
    OutboundDelivery,
    TransferIn,
    TransferOut,
    Dividend,
    /// Market value of the holding at the end of the reporting period
    TerminalValuation,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Buy => "BUY",
            TransactionKind::Sell => "SELL",
            TransactionKind::InboundDelivery => "DELIVERY_INBOUND",
            TransactionKind::OutboundDelivery => "DELIVERY_OUTBOUND",
            TransactionKind::TransferIn => "TRANSFER_IN",
            TransactionKind::TransferOut => "TRANSFER_OUT",
            TransactionKind::Dividend => "DIVIDEND",
            TransactionKind::TerminalValuation => "VALUATION",
        }
    }

    /// Adds shares to the holding (creates a FIFO lot)
    pub fn is_inbound(&self) -> bool {
        matches!(
            self,
            TransactionKind::Buy | TransactionKind::InboundDelivery | TransactionKind::TransferIn
        )
    }

    /// Removes shares from the holding (consumes FIFO lots)
    pub fn is_outbound(&self) -> bool {
        matches!(
            self,
            TransactionKind::Sell | TransactionKind::OutboundDelivery | TransactionKind::TransferOut
        )
    }

    /// Position among transactions sharing a date: inbound first, then
    /// dividends, then outbound, the terminal valuation last.
    pub fn sort_priority(&self) -> u8 {
        match self {
            TransactionKind::InboundDelivery => 0,
            TransactionKind::Buy => 1,
            TransactionKind::TransferIn => 2,
            TransactionKind::Dividend => 3,
            TransactionKind::TransferOut => 4,
            TransactionKind::Sell => 5,
            TransactionKind::OutboundDelivery => 6,
            TransactionKind::TerminalValuation => 7,
        }
    }
}

impl FromStr for TransactionKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "BUY" | "PURCHASE" => Ok(TransactionKind::Buy),
            "SELL" | "SALE" => Ok(TransactionKind::Sell),
            "DELIVERY_INBOUND" | "INBOUND_DELIVERY" => Ok(TransactionKind::InboundDelivery),
            "DELIVERY_OUTBOUND" | "OUTBOUND_DELIVERY" => Ok(TransactionKind::OutboundDelivery),
            "TRANSFER_IN" => Ok(TransactionKind::TransferIn),
            "TRANSFER_OUT" => Ok(TransactionKind::TransferOut),
            "DIVIDEND" | "DIVIDENDS" => Ok(TransactionKind::Dividend),
            "VALUATION" | "TERMINAL_VALUATION" | "MARKET_VALUE" => {
                Ok(TransactionKind::TerminalValuation)
            }
            _ => Err(()),
        }
    }
}

/// Dated event against one security.
///
/// `amount` is the cash moved: for inbound kinds it includes fees and taxes,
/// for outbound kinds it is the net proceeds, for dividends the net payment
/// and for the terminal valuation the market value. `shares` is a magnitude
/// scaled by [`crate::money::SHARE_FACTOR`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub security: String,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub amount: Money,
    pub shares: i64,
    pub fees: Money,
    pub taxes: Money,
    pub note: Option<String>,
}

impl Transaction {
    pub fn new(
        security: impl Into<String>,
        date: NaiveDate,
        kind: TransactionKind,
        amount: Money,
    ) -> Self {
        let currency = amount.currency().to_string();
        Self {
            security: security.into(),
            date,
            kind,
            amount,
            shares: 0,
            fees: Money::zero(currency.clone()),
            taxes: Money::zero(currency),
            note: None,
        }
    }

    pub fn with_shares(mut self, shares: i64) -> Self {
        self.shares = shares;
        self
    }

    pub fn with_fees(mut self, fees: Money) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_taxes(mut self, taxes: Money) -> Self {
        self.taxes = taxes;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str_aliases() {
        assert_eq!(TransactionKind::from_str("buy"), Ok(TransactionKind::Buy));
        assert_eq!(
            TransactionKind::from_str("delivery-inbound"),
            Ok(TransactionKind::InboundDelivery)
        );
        assert_eq!(
            TransactionKind::from_str("Transfer Out"),
            Ok(TransactionKind::TransferOut)
        );
        assert_eq!(
            TransactionKind::from_str("valuation"),
            Ok(TransactionKind::TerminalValuation)
        );
        assert!(TransactionKind::from_str("split").is_err());
    }

    #[test]
    fn test_direction_is_exclusive() {
        assert!(TransactionKind::TransferIn.is_inbound());
        assert!(!TransactionKind::TransferIn.is_outbound());
        assert!(TransactionKind::OutboundDelivery.is_outbound());
        assert!(!TransactionKind::Dividend.is_inbound());
        assert!(!TransactionKind::Dividend.is_outbound());
        assert!(!TransactionKind::TerminalValuation.is_inbound());
    }
}
