use std::fs::File;
use std::io::Read;
use std::path::Path;

use itertools::Itertools;
use serde::Deserialize;
use tracing::{debug, info};

use super::{csv_error, line_number, parse_date, parse_decimal, parse_optional_decimal};
use crate::error::{PerformanceError, Result};
use crate::model::{Security, Transaction, TransactionKind};
use crate::money::{shares_from_decimal, Money};

/// `date,security,kind,amount,currency,shares,fees,taxes,note`
#[derive(Debug, Deserialize)]
struct TransactionRow {
    date: String,
    security: String,
    kind: String,
    amount: String,
    currency: String,
    #[serde(default)]
    shares: Option<String>,
    #[serde(default)]
    fees: Option<String>,
    #[serde(default)]
    taxes: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let file = File::open(path).map_err(|e| {
        PerformanceError::Parse(format!("cannot open {}: {}", path.display(), e))
    })?;
    info!("Reading transactions from {:?}", path);
    read_transactions(file)
}

/// Rows with an empty security column are skipped. Amounts, fees and
/// taxes are in the row's currency; shares are taken as a magnitude.
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut transactions = Vec::new();
    for (idx, row) in csv_reader.deserialize::<TransactionRow>().enumerate() {
        let line = line_number(idx);
        let row = row.map_err(csv_error)?;
        if row.security.is_empty() {
            debug!("Skipping line {} without security", line);
            continue;
        }
        transactions.push(parse_row(row, line)?);
    }

    info!("Parsed {} transactions", transactions.len());
    Ok(transactions)
}

fn parse_row(row: TransactionRow, line: usize) -> Result<Transaction> {
    let date = parse_date(&row.date, line)?;
    let kind: TransactionKind = row.kind.parse().map_err(|_| {
        PerformanceError::Parse(format!(
            "line {line}: unknown transaction kind '{}'",
            row.kind
        ))
    })?;

    let currency = row.currency.to_uppercase();
    if currency.is_empty() {
        return Err(PerformanceError::Parse(format!(
            "line {line}: missing currency"
        )));
    }

    let amount = Money::from_decimal(&currency, parse_decimal(&row.amount, "amount", line)?.abs())?;
    let shares = parse_optional_decimal(row.shares.as_deref(), "shares", line)?;
    let fees = parse_optional_decimal(row.fees.as_deref(), "fees", line)?;
    let taxes = parse_optional_decimal(row.taxes.as_deref(), "taxes", line)?;

    let mut tx = Transaction::new(row.security, date, kind, amount)
        .with_shares(shares_from_decimal(shares.abs())?)
        .with_fees(Money::from_decimal(&currency, fees.abs())?)
        .with_taxes(Money::from_decimal(&currency, taxes.abs())?);
    if let Some(note) = row.note.filter(|n| !n.is_empty()) {
        tx = tx.with_note(note);
    }
    Ok(tx)
}

/// One security per distinct id, in order of first appearance, named after
/// its id and quoted in the currency of its first transaction
pub fn securities_from_transactions(transactions: &[Transaction]) -> Vec<Security> {
    transactions
        .iter()
        .unique_by(|tx| tx.security.as_str())
        .map(|tx| Security::new(&tx.security, &tx.security, tx.amount.currency()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::SHARE_FACTOR;
    use chrono::NaiveDate;

    const SAMPLE: &str = "\
date,security,kind,amount,currency,shares,fees,taxes,note
2024-01-02,ACME,buy,1015.00,eur,10,10.00,5.00,first lot
2024-03-15,ACME,dividend,12.34,EUR,,,,
,,,,,,,,
2024-06-01,GLOBEX,delivery_inbound,500,USD,2.5,,,
2024-12-31,ACME,valuation,1100,EUR,,,,
";

    #[test]
    fn test_read_sample_file() {
        let txs = read_transactions(SAMPLE.as_bytes()).unwrap();
        assert_eq!(txs.len(), 4);

        let buy = &txs[0];
        assert_eq!(buy.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(buy.kind, TransactionKind::Buy);
        assert_eq!(buy.amount, Money::of("EUR", 101_500));
        assert_eq!(buy.shares, 10 * SHARE_FACTOR);
        assert_eq!(buy.fees, Money::of("EUR", 1_000));
        assert_eq!(buy.taxes, Money::of("EUR", 500));
        assert_eq!(buy.note.as_deref(), Some("first lot"));

        assert_eq!(txs[1].kind, TransactionKind::Dividend);
        assert_eq!(txs[1].shares, 0);
        assert_eq!(txs[1].note, None);
        assert_eq!(txs[2].shares, SHARE_FACTOR * 5 / 2);
        assert_eq!(txs[3].kind, TransactionKind::TerminalValuation);
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let data = "date,security,kind,amount,currency\n2024-01-02,ACME,sell,10,EUR\n";
        let txs = read_transactions(data.as_bytes()).unwrap();
        assert_eq!(txs[0].kind, TransactionKind::Sell);
        assert_eq!(txs[0].fees, Money::zero("EUR"));
    }

    #[test]
    fn test_unknown_kind_reports_line() {
        let data = "date,security,kind,amount,currency\n2024-01-02,ACME,bought,10,EUR\n";
        let err = read_transactions(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(err.to_string().contains("bought"));
    }

    #[test]
    fn test_securities_in_order_of_appearance() {
        let txs = read_transactions(SAMPLE.as_bytes()).unwrap();
        let securities = securities_from_transactions(&txs);
        let ids: Vec<&str> = securities.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["ACME", "GLOBEX"]);
        assert_eq!(securities[1].currency, "USD");
    }
}
