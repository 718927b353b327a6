//! Currency conversion into a single reporting (term) currency

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{round_to_i64, Money};
use crate::error::{PerformanceError, Result};

/// Converts monetary values into the reporting currency at a given date.
///
/// Implementations must be deterministic: the same date and value always
/// yield the same result.
pub trait CurrencyConverter: Send + Sync {
    fn term_currency(&self) -> &str;

    fn convert(&self, date: NaiveDate, money: &Money) -> Result<Money>;
}

/// Exchange rates per currency, each a date-sorted series of
/// "term currency units per unit of the currency".
///
/// Lookup uses the latest rate on or before the requested date and falls
/// back to the earliest known rate for dates before the series starts.
#[derive(Debug, Clone)]
pub struct RateTable {
    term_currency: String,
    rates: HashMap<String, Vec<(NaiveDate, Decimal)>>,
}

impl RateTable {
    pub fn new(term_currency: impl Into<String>) -> Self {
        Self {
            term_currency: term_currency.into(),
            rates: HashMap::new(),
        }
    }

    /// Add or replace the rate of `currency` on `date`
    pub fn add_rate(&mut self, currency: &str, date: NaiveDate, rate: Decimal) {
        let series = self.rates.entry(currency.to_ascii_uppercase()).or_default();
        match series.binary_search_by_key(&date, |(d, _)| *d) {
            Ok(idx) => series[idx].1 = rate,
            Err(idx) => series.insert(idx, (date, rate)),
        }
    }

    pub fn with_rate(mut self, currency: &str, date: NaiveDate, rate: Decimal) -> Self {
        self.add_rate(currency, date, rate);
        self
    }

    pub fn rate_at(&self, currency: &str, date: NaiveDate) -> Option<Decimal> {
        let series = self.rates.get(&currency.to_ascii_uppercase())?;
        let idx = series.partition_point(|(d, _)| *d <= date);
        if idx == 0 {
            series.first().map(|(_, rate)| *rate)
        } else {
            Some(series[idx - 1].1)
        }
    }
}

impl CurrencyConverter for RateTable {
    fn term_currency(&self) -> &str {
        &self.term_currency
    }

    fn convert(&self, date: NaiveDate, money: &Money) -> Result<Money> {
        if money.currency().eq_ignore_ascii_case(&self.term_currency) {
            return Ok(Money::of(self.term_currency.clone(), money.amount()));
        }

        let rate = self
            .rate_at(money.currency(), date)
            .ok_or_else(|| PerformanceError::MissingExchangeRate {
                currency: money.currency().to_string(),
                date,
            })?;

        let converted = Decimal::from(money.amount())
            .checked_mul(rate)
            .ok_or_else(|| PerformanceError::AmountOutOfRange(money.to_string()))?;

        Ok(Money::of(self.term_currency.clone(), round_to_i64(converted)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_same_currency_is_identity() {
        let table = RateTable::new("EUR");
        let converted = table.convert(date(2024, 1, 1), &Money::of("EUR", 1234)).unwrap();
        assert_eq!(converted, Money::of("EUR", 1234));
    }

    #[test]
    fn test_uses_latest_rate_on_or_before_date() {
        let table = RateTable::new("EUR")
            .with_rate("USD", date(2024, 1, 1), dec!(0.90))
            .with_rate("USD", date(2024, 6, 1), dec!(0.95));

        let jan = table.convert(date(2024, 3, 15), &Money::of("USD", 10_000)).unwrap();
        assert_eq!(jan, Money::of("EUR", 9_000));

        let june = table.convert(date(2024, 6, 1), &Money::of("USD", 10_000)).unwrap();
        assert_eq!(june, Money::of("EUR", 9_500));

        // before the series starts: earliest rate
        let early = table.convert(date(2023, 1, 1), &Money::of("USD", 10_000)).unwrap();
        assert_eq!(early, Money::of("EUR", 9_000));
    }

    #[test]
    fn test_conversion_rounds_half_away_from_zero() {
        let table = RateTable::new("EUR").with_rate("USD", date(2024, 1, 1), dec!(0.5));
        assert_eq!(
            table.convert(date(2024, 1, 2), &Money::of("USD", 3)).unwrap().amount(),
            2
        );
        assert_eq!(
            table.convert(date(2024, 1, 2), &Money::of("USD", -3)).unwrap().amount(),
            -2
        );
    }

    #[test]
    fn test_missing_currency_is_an_error() {
        let table = RateTable::new("EUR");
        let err = table
            .convert(date(2024, 1, 1), &Money::of("CHF", 100))
            .unwrap_err();
        assert!(matches!(err, PerformanceError::MissingExchangeRate { .. }));
    }
}
