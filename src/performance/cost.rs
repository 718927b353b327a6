use std::collections::VecDeque;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use super::convert_at;
use crate::error::{PerformanceError, Result};
use crate::model::Transaction;
use crate::money::{CurrencyConverter, Money, SHARE_FACTOR};

/// Open inventory created by an inbound transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lot {
    pub acquired: NaiveDate,
    pub original_shares: i64,
    pub remaining_shares: i64,
    /// Converted amount paid, fees and taxes included
    pub gross_cost: i64,
    /// Converted amount paid minus fees and taxes
    pub net_cost: i64,
}

impl Lot {
    pub fn remaining_gross_cost(&self) -> i64 {
        proportional(self.gross_cost, self.remaining_shares, self.original_shares)
    }

    pub fn remaining_net_cost(&self) -> i64 {
        proportional(self.net_cost, self.remaining_shares, self.original_shares)
    }
}

/// Shares taken from one lot by one outbound transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LotConsumption {
    pub acquired: NaiveDate,
    pub disposed: NaiveDate,
    pub shares: i64,
    pub gross_cost: i64,
    pub net_cost: i64,
}

/// FIFO lot queue for a single security
#[derive(Debug, Default)]
pub struct FifoMatcher {
    lots: VecDeque<Lot>,
}

impl FifoMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_lot(&mut self, acquired: NaiveDate, shares: i64, gross_cost: i64, net_cost: i64) {
        if shares <= 0 {
            return;
        }
        self.lots.push_back(Lot {
            acquired,
            original_shares: shares,
            remaining_shares: shares,
            gross_cost,
            net_cost,
        });
    }

    /// Take `shares` from the oldest lots first.
    ///
    /// Fails without touching the queue when fewer shares are open than
    /// requested. Cost realized from a lot is the drop in its remaining
    /// cost, so a lot consumed in several steps realizes exactly its cost.
    pub fn consume(&mut self, disposed: NaiveDate, shares: i64) -> Result<Vec<LotConsumption>> {
        let available = self.shares_held();
        if shares > available {
            return Err(PerformanceError::OversoldInventory {
                date: disposed,
                requested: shares,
                available,
            });
        }

        let mut consumptions = Vec::new();
        let mut to_consume = shares;

        while to_consume > 0 {
            let Some(lot) = self.lots.front_mut() else {
                break;
            };

            let taken = lot.remaining_shares.min(to_consume);
            let gross_before = lot.remaining_gross_cost();
            let net_before = lot.remaining_net_cost();
            lot.remaining_shares -= taken;

            consumptions.push(LotConsumption {
                acquired: lot.acquired,
                disposed,
                shares: taken,
                gross_cost: gross_before - lot.remaining_gross_cost(),
                net_cost: net_before - lot.remaining_net_cost(),
            });

            to_consume -= taken;
            if lot.remaining_shares == 0 {
                self.lots.pop_front();
            }
        }

        Ok(consumptions)
    }

    pub fn shares_held(&self) -> i64 {
        self.lots.iter().map(|l| l.remaining_shares).sum()
    }

    pub fn fifo_cost(&self) -> i64 {
        self.lots.iter().map(Lot::remaining_gross_cost).sum()
    }

    pub fn net_fifo_cost(&self) -> i64 {
        self.lots.iter().map(Lot::remaining_net_cost).sum()
    }

    pub fn open_lots(&self) -> impl Iterator<Item = &Lot> {
        self.lots.iter()
    }
}

/// Result of running the FIFO engine over one transaction slice
#[derive(Debug, Clone)]
pub struct CostSummary {
    pub shares_held: i64,
    pub fifo_cost: Money,
    pub net_fifo_cost: Money,
    pub fees: Money,
    pub taxes: Money,
    /// Outbound proceeds minus the gross cost of the lots they consumed
    pub realized_gain: Money,
    pub consumed_shares: i64,
    pub consumptions: Vec<LotConsumption>,
}

/// Run the FIFO engine over date-ordered transactions.
///
/// Fees and taxes are summed over every transaction, independent of lot
/// matching.
pub fn calculate_costs(
    transactions: &[Transaction],
    converter: &dyn CurrencyConverter,
) -> Result<CostSummary> {
    let term = converter.term_currency();
    let mut matcher = FifoMatcher::new();
    let mut fees = 0i64;
    let mut taxes = 0i64;
    let mut realized_gain = 0i64;
    let mut consumed_shares = 0i64;
    let mut consumptions = Vec::new();

    for tx in transactions {
        let tx_fees = convert_at(converter, tx.date, &tx.fees)?;
        let tx_taxes = convert_at(converter, tx.date, &tx.taxes)?;
        fees += tx_fees;
        taxes += tx_taxes;

        let shares = tx.shares.abs();
        if shares == 0 {
            continue;
        }

        if tx.kind.is_inbound() {
            let gross = convert_at(converter, tx.date, &tx.amount)?;
            matcher.add_lot(tx.date, shares, gross, gross - tx_fees - tx_taxes);
        } else if tx.kind.is_outbound() {
            let consumed = matcher.consume(tx.date, shares).inspect_err(|e| {
                warn!("FIFO: {} for security {}", e, tx.security);
            })?;
            let proceeds = convert_at(converter, tx.date, &tx.amount)?;
            let cost: i64 = consumed.iter().map(|c| c.gross_cost).sum();
            realized_gain += proceeds - cost;
            consumed_shares += consumed.iter().map(|c| c.shares).sum::<i64>();
            consumptions.extend(consumed);
        }
    }

    Ok(CostSummary {
        shares_held: matcher.shares_held(),
        fifo_cost: Money::of(term, matcher.fifo_cost()),
        net_fifo_cost: Money::of(term, matcher.net_fifo_cost()),
        fees: Money::of(term, fees),
        taxes: Money::of(term, taxes),
        realized_gain: Money::of(term, realized_gain),
        consumed_shares,
        consumptions,
    })
}

/// Cost of one share (`net_cost / shares`), rounded half away from zero to
/// a minor unit. Undefined when no shares are held.
pub fn cost_per_share(net_cost: i64, shares_held: i64) -> Result<i64> {
    if shares_held <= 0 {
        return Err(PerformanceError::DivisionUndefined);
    }
    let numerator = net_cost as i128 * SHARE_FACTOR as i128;
    let denominator = shares_held as i128;
    let mut quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if 2 * remainder.abs() >= denominator {
        quotient += numerator.signum();
    }
    i64::try_from(quotient).map_err(|_| {
        PerformanceError::AmountOutOfRange(format!(
            "cost per share of {} over {} shares",
            net_cost, shares_held
        ))
    })
}

fn proportional(cost: i64, part: i64, whole: i64) -> i64 {
    if whole == 0 {
        return 0;
    }
    (cost as i128 * part as i128 / whole as i128) as i64
}
