use std::fs::File;
use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use super::{csv_error, line_number, parse_date, parse_decimal};
use crate::error::{PerformanceError, Result};
use crate::money::RateTable;

/// `date,currency,rate`, rate in units of the term currency per unit
#[derive(Debug, Deserialize)]
struct RateRow {
    date: String,
    currency: String,
    rate: String,
}

pub fn load_rates(path: &Path, term_currency: &str) -> Result<RateTable> {
    let file = File::open(path).map_err(|e| {
        PerformanceError::Parse(format!("cannot open {}: {}", path.display(), e))
    })?;
    info!("Reading exchange rates from {:?}", path);
    read_rates(file, term_currency)
}

pub fn read_rates<R: Read>(reader: R, term_currency: &str) -> Result<RateTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut table = RateTable::new(term_currency.to_uppercase());
    let mut count = 0usize;
    for (idx, row) in csv_reader.deserialize::<RateRow>().enumerate() {
        let line = line_number(idx);
        let row = row.map_err(csv_error)?;
        let date = parse_date(&row.date, line)?;
        let rate = parse_decimal(&row.rate, "rate", line)?;
        if rate <= Decimal::ZERO {
            return Err(PerformanceError::Parse(format!(
                "line {line}: rate must be positive, got {rate}"
            )));
        }
        table.add_rate(&row.currency.to_uppercase(), date, rate);
        count += 1;
    }

    info!("Loaded {} exchange rates into {}", count, term_currency);
    Ok(table)
}
