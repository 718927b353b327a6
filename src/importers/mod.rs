//! CSV readers for transactions, exchange rates and return curves
//!
//! Every reader takes any `Read` so tests can feed in-memory data; the
//! `load_*` helpers open a path. A header row is required. Bad rows fail
//! the whole file with the 1-based line number in the message.

pub mod curves;
pub mod rates;
pub mod transactions;

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{PerformanceError, Result};

pub use curves::{load_curves, read_curves};
pub use rates::{load_rates, read_rates};
pub use transactions::{load_transactions, read_transactions, securities_from_transactions};

/// Line of a data row; the header is line 1
fn line_number(row_index: usize) -> usize {
    row_index + 2
}

fn parse_date(text: &str, line: usize) -> Result<NaiveDate> {
    let text = text.trim();
    ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .ok_or_else(|| PerformanceError::Parse(format!("line {line}: invalid date '{text}'")))
}

fn parse_decimal(text: &str, field: &str, line: usize) -> Result<Decimal> {
    let cleaned = text.trim().replace('_', "");
    Decimal::from_str(&cleaned).map_err(|_| {
        PerformanceError::Parse(format!("line {line}: invalid {field} '{}'", text.trim()))
    })
}

/// Empty or missing optional cells read as zero
fn parse_optional_decimal(text: Option<&str>, field: &str, line: usize) -> Result<Decimal> {
    match text.map(str::trim) {
        None | Some("") => Ok(Decimal::ZERO),
        Some(value) => parse_decimal(value, field, line),
    }
}

fn csv_error(e: csv::Error) -> PerformanceError {
    PerformanceError::Parse(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_date("2024-03-15", 2).unwrap(), expected);
        assert_eq!(parse_date(" 15/03/2024 ", 2).unwrap(), expected);
        assert_eq!(parse_date("15.03.2024", 2).unwrap(), expected);

        let err = parse_date("March 15", 7).unwrap_err();
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1_000.50", "amount", 2).unwrap(), dec!(1000.50));
        assert_eq!(parse_optional_decimal(None, "fees", 2).unwrap(), Decimal::ZERO);
        assert_eq!(parse_optional_decimal(Some(" "), "fees", 2).unwrap(), Decimal::ZERO);
        assert!(parse_decimal("12abc", "amount", 2).is_err());
    }
}
