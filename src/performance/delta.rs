use super::convert_at;
use crate::error::Result;
use crate::model::{Transaction, TransactionKind};
use crate::money::{CurrencyConverter, Money};

/// Components of the absolute gain, each converted at its transaction date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeltaBreakdown {
    pub market_value: i64,
    /// Net proceeds of sells, transfers out and outbound deliveries
    pub proceeds: i64,
    pub dividends: i64,
    /// Amounts paid for inbound transactions, fees and taxes included
    pub purchases: i64,
}

impl DeltaBreakdown {
    pub fn delta(&self) -> i64 {
        self.market_value + self.proceeds + self.dividends - self.purchases
    }
}

pub fn calculate_breakdown(
    transactions: &[Transaction],
    converter: &dyn CurrencyConverter,
) -> Result<DeltaBreakdown> {
    let mut breakdown = DeltaBreakdown::default();
    for tx in transactions {
        let amount = convert_at(converter, tx.date, &tx.amount)?;
        match tx.kind {
            TransactionKind::TerminalValuation => breakdown.market_value += amount,
            TransactionKind::Dividend => breakdown.dividends += amount,
            kind if kind.is_outbound() => breakdown.proceeds += amount,
            _ => breakdown.purchases += amount,
        }
    }
    Ok(breakdown)
}

/// market value + proceeds + dividends - purchase costs
pub fn calculate_delta(
    transactions: &[Transaction],
    converter: &dyn CurrencyConverter,
) -> Result<Money> {
    let breakdown = calculate_breakdown(transactions, converter)?;
    Ok(Money::of(converter.term_currency(), breakdown.delta()))
}

/// Sum of the terminal valuations
pub fn calculate_market_value(
    transactions: &[Transaction],
    converter: &dyn CurrencyConverter,
) -> Result<Money> {
    let mut market_value = 0i64;
    for tx in transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::TerminalValuation)
    {
        market_value += convert_at(converter, tx.date, &tx.amount)?;
    }
    Ok(Money::of(converter.term_currency(), market_value))
}
