//! Per-security performance engine
//!
//! [`calculate`] runs the calculators in a fixed order over a sorted copy
//! of the transactions: market value, IRR, time-weighted return and risk,
//! delta, FIFO cost, dividends. [`RecordBuilder`] adds the opening position
//! of a holding carried into the interval.

use chrono::NaiveDate;

use crate::error::Result;
use crate::money::{CurrencyConverter, Money};

pub mod batch;
pub mod cost;
pub mod delta;
pub mod dividends;
pub mod irr;
pub mod opening;
pub mod ordering;
pub mod period;
pub mod record;
pub mod risk;

pub use batch::{calculate_all, BatchOutcome};
pub use dividends::Periodicity;
pub use period::{ReportingInterval, ReportingPeriod};
pub use record::{calculate, PerformanceRecord, RecordBuilder};

/// Converted amount in minor units of the term currency. Zero amounts
/// skip the converter, so a missing rate never fails an empty fee.
pub(crate) fn convert_at(
    converter: &dyn CurrencyConverter,
    date: NaiveDate,
    money: &Money,
) -> Result<i64> {
    if money.is_zero() {
        return Ok(0);
    }
    Ok(converter.convert(date, money)?.amount())
}
