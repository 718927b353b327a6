//! Holding carried into a reporting interval
//!
//! A position opened before the interval enters it as an inbound delivery
//! on the first day, valued at the latest valuation before the interval or
//! at its remaining FIFO cost when there is none.

use tracing::debug;

use super::{convert_at, cost, ordering, ReportingInterval};
use crate::error::{PerformanceError, Result};
use crate::model::{Security, Transaction, TransactionKind};
use crate::money::{CurrencyConverter, Money};

pub const OPENING_NOTE: &str = "opening position";

/// Opening delivery for the shares still held at `interval.start`, or None
/// when `history` leaves nothing open.
///
/// `history` holds the transactions of `security` dated before the
/// interval, in any order.
pub fn opening_position(
    security: &Security,
    history: &[Transaction],
    interval: &ReportingInterval,
    converter: &dyn CurrencyConverter,
) -> Result<Option<Transaction>> {
    if history.is_empty() {
        return Ok(None);
    }

    let mut sorted = history.to_vec();
    ordering::sort_transactions(&mut sorted);

    let costs = cost::calculate_costs(&sorted, converter)?;
    if costs.shares_held == 0 {
        return Ok(None);
    }

    let valuation = sorted
        .iter()
        .rev()
        .find(|tx| tx.kind == TransactionKind::TerminalValuation);
    let value = match valuation {
        Some(valuation) => {
            let amount = convert_at(converter, valuation.date, &valuation.amount)?;
            scale_to_holding(amount, valuation.shares, costs.shares_held)?
        }
        None => costs.fifo_cost.amount(),
    };

    debug!(
        "{}: opening position of {} shares worth {} on {} ({})",
        security.id,
        costs.shares_held,
        value,
        interval.start,
        if valuation.is_some() { "valuation" } else { "fifo cost" }
    );

    Ok(Some(
        Transaction::new(
            security.id.clone(),
            interval.start,
            TransactionKind::InboundDelivery,
            Money::of(converter.term_currency(), value),
        )
        .with_shares(costs.shares_held)
        .with_note(OPENING_NOTE),
    ))
}

/// A valuation that counted a different number of shares is scaled to
/// the shares actually held. Valuations without shares are taken as is.
fn scale_to_holding(amount: i64, valued_shares: i64, held_shares: i64) -> Result<i64> {
    let valued_shares = valued_shares.abs();
    if valued_shares == 0 || valued_shares == held_shares {
        return Ok(amount);
    }
    let scaled = amount as i128 * held_shares as i128 / valued_shares as i128;
    i64::try_from(scaled).map_err(|_| {
        PerformanceError::AmountOutOfRange(format!(
            "valuation {} scaled to {} shares",
            amount, held_shares
        ))
    })
}
