use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use super::dividends::{self, Periodicity};
use super::{cost, delta, irr, opening, ordering, risk, ReportingInterval};
use crate::config::PerformanceConfig;
use crate::error::Result;
use crate::index::{Drawdown, IndexSummary, PerformanceIndexBuilder, Volatility};
use crate::model::{Attributable, InvestmentVehicle, Named, Security, Transaction};
use crate::money::{CurrencyConverter, Money};

/// Performance figures of one security over one reporting interval.
///
/// Monetary values are in the converter's term currency. A record is
/// immutable; recalculating means building a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRecord {
    security: Security,
    #[serde(skip)]
    transactions: Vec<Transaction>,
    irr: f64,
    true_time_weighted_rate_of_return: f64,
    drawdown: Drawdown,
    volatility: Volatility,
    delta: Money,
    market_value: Money,
    fifo_cost: Money,
    net_fifo_cost: Money,
    fees: Money,
    taxes: Money,
    shares_held: i64,
    realized_gain: Money,
    sum_of_dividends: Money,
    dividend_event_count: usize,
    last_dividend_payment: Option<NaiveDate>,
    periodicity: Periodicity,
}

impl PerformanceRecord {
    fn empty(security: Security, currency: &str) -> Self {
        let zero = Money::zero(currency);
        Self {
            security,
            transactions: Vec::new(),
            irr: 0.0,
            true_time_weighted_rate_of_return: 0.0,
            drawdown: Drawdown::default(),
            volatility: Volatility::default(),
            delta: zero.clone(),
            market_value: zero.clone(),
            fifo_cost: zero.clone(),
            net_fifo_cost: zero.clone(),
            fees: zero.clone(),
            taxes: zero.clone(),
            shares_held: 0,
            realized_gain: zero.clone(),
            sum_of_dividends: zero,
            dividend_event_count: 0,
            last_dividend_payment: None,
            periodicity: Periodicity::Unknown,
        }
    }

    pub fn security(&self) -> &Security {
        &self.security
    }

    /// Transactions in calculation order
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn irr(&self) -> f64 {
        self.irr
    }

    pub fn true_time_weighted_rate_of_return(&self) -> f64 {
        self.true_time_weighted_rate_of_return
    }

    pub fn max_drawdown(&self) -> f64 {
        self.drawdown.max_drawdown
    }

    /// In days
    pub fn max_drawdown_duration(&self) -> i64 {
        self.drawdown.max_drawdown_duration_days
    }

    pub fn volatility(&self) -> f64 {
        self.volatility.standard_deviation
    }

    pub fn semi_volatility(&self) -> f64 {
        self.volatility.semi_deviation
    }

    pub fn delta(&self) -> &Money {
        &self.delta
    }

    pub fn market_value(&self) -> &Money {
        &self.market_value
    }

    pub fn fifo_cost(&self) -> &Money {
        &self.fifo_cost
    }

    pub fn net_fifo_cost(&self) -> &Money {
        &self.net_fifo_cost
    }

    /// Net FIFO cost of one share
    pub fn fifo_cost_per_shares_held(&self) -> Result<Money> {
        cost::cost_per_share(self.net_fifo_cost.amount(), self.shares_held)
            .map(|amount| self.net_fifo_cost.with_amount(amount))
    }

    pub fn fees(&self) -> &Money {
        &self.fees
    }

    pub fn taxes(&self) -> &Money {
        &self.taxes
    }

    /// Scaled by [`crate::money::SHARE_FACTOR`]
    pub fn shares_held(&self) -> i64 {
        self.shares_held
    }

    pub fn realized_gain(&self) -> &Money {
        &self.realized_gain
    }

    pub fn sum_of_dividends(&self) -> &Money {
        &self.sum_of_dividends
    }

    pub fn dividend_event_count(&self) -> usize {
        self.dividend_event_count
    }

    pub fn last_dividend_payment(&self) -> Option<NaiveDate> {
        self.last_dividend_payment
    }

    pub fn periodicity(&self) -> Periodicity {
        self.periodicity
    }

    pub fn periodicity_sort(&self) -> u8 {
        self.periodicity.sort_key()
    }

    /// Dividends relative to the remaining FIFO cost, 0 when nothing is held
    pub fn total_rate_of_return_div(&self) -> f64 {
        if self.shares_held > 0 && self.fifo_cost.amount() != 0 {
            self.sum_of_dividends.amount() as f64 / self.fifo_cost.amount() as f64
        } else {
            0.0
        }
    }
}

impl Named for PerformanceRecord {
    fn name(&self) -> &str {
        self.security.name()
    }

    fn note(&self) -> Option<&str> {
        self.security.note()
    }
}

impl Attributable for PerformanceRecord {
    fn attributes(&self) -> &BTreeMap<String, String> {
        self.security.attributes()
    }
}

impl InvestmentVehicle for PerformanceRecord {
    fn uuid(&self) -> &str {
        self.security.uuid()
    }

    fn currency_code(&self) -> &str {
        self.security.currency_code()
    }
}

/// Collects the transactions of one security before calculating.
///
/// Transactions dated before the reporting interval are kept apart as
/// history; they only decide the opening position.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    security: Security,
    transactions: Vec<Transaction>,
    history: Vec<Transaction>,
}

impl RecordBuilder {
    pub fn new(security: Security) -> Self {
        Self {
            security,
            transactions: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Keep the transactions of `security` dated inside `interval`, and
    /// the earlier ones as history. Only matching rows are cloned.
    pub fn from_transactions<'a>(
        security: Security,
        transactions: impl IntoIterator<Item = &'a Transaction>,
        interval: &ReportingInterval,
    ) -> Self {
        let mut builder = Self::new(security);
        for tx in transactions {
            if tx.security != builder.security.id {
                continue;
            }
            if tx.date < interval.start {
                builder.history.push(tx.clone());
            } else if interval.contains(tx.date) {
                builder.transactions.push(tx.clone());
            }
        }
        builder
    }

    pub fn add_transaction(&mut self, transaction: Transaction) {
        debug_assert_eq!(transaction.security, self.security.id);
        self.transactions.push(transaction);
    }

    pub fn security(&self) -> &Security {
        &self.security
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Transactions before the interval
    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    /// Calculate the record, opening with the holding carried in from the
    /// history when the interval has transactions of its own.
    pub fn calculate(
        &self,
        converter: &dyn CurrencyConverter,
        index: &dyn PerformanceIndexBuilder,
        interval: &ReportingInterval,
        config: &PerformanceConfig,
    ) -> Result<PerformanceRecord> {
        if self.transactions.is_empty() {
            return calculate(&self.security, &[], converter, index, interval, config);
        }

        match opening::opening_position(&self.security, &self.history, interval, converter)? {
            Some(opening) => {
                let mut transactions = Vec::with_capacity(self.transactions.len() + 1);
                transactions.push(opening);
                transactions.extend(self.transactions.iter().cloned());
                calculate(&self.security, &transactions, converter, index, interval, config)
            }
            None => calculate(
                &self.security,
                &self.transactions,
                converter,
                index,
                interval,
                config,
            ),
        }
    }
}

/// Calculate every figure of the record.
///
/// The transactions are sorted into a private copy first. Any failing
/// stage fails the whole record.
pub fn calculate(
    security: &Security,
    transactions: &[Transaction],
    converter: &dyn CurrencyConverter,
    index: &dyn PerformanceIndexBuilder,
    interval: &ReportingInterval,
    config: &PerformanceConfig,
) -> Result<PerformanceRecord> {
    let term = converter.term_currency();
    if transactions.is_empty() {
        debug!("No transactions for {}, returning empty record", security.id);
        return Ok(PerformanceRecord::empty(security.clone(), term));
    }

    info!(
        "Calculating performance for {} ({} transactions, {}..{})",
        security.id,
        transactions.len(),
        interval.start,
        interval.end
    );

    let mut sorted = transactions.to_vec();
    ordering::sort_transactions(&mut sorted);

    let market_value = delta::calculate_market_value(&sorted, converter)?;

    let flows = irr::collect_cash_flows(&sorted, converter)?;
    let irr = irr::calculate_irr(&flows, &config.solver)?;

    let IndexSummary {
        final_accumulated_percentage,
        drawdown,
        volatility,
    } = risk::calculate_risk(security, interval, converter, index)?;

    let delta = delta::calculate_delta(&sorted, converter)?;
    let costs = cost::calculate_costs(&sorted, converter)?;
    let dividends = dividends::calculate_dividends(&sorted, converter, &config.periodicity)?;

    debug!(
        "{}: irr={:.6} ttwror={:.6} delta={} periodicity={}",
        security.id, irr, final_accumulated_percentage, delta, dividends.periodicity
    );

    Ok(PerformanceRecord {
        security: security.clone(),
        transactions: sorted,
        irr,
        true_time_weighted_rate_of_return: final_accumulated_percentage,
        drawdown,
        volatility,
        delta,
        market_value,
        fifo_cost: costs.fifo_cost,
        net_fifo_cost: costs.net_fifo_cost,
        fees: costs.fees,
        taxes: costs.taxes,
        shares_held: costs.shares_held,
        realized_gain: costs.realized_gain,
        sum_of_dividends: dividends.sum,
        dividend_event_count: dividends.event_count,
        last_dividend_payment: dividends.last_payment,
        periodicity: dividends.periodicity,
    })
}
