//! Output formatting for the report command
//!
//! Keeps presentation apart from the engine: the dispatcher hands over the
//! batch outcomes and prints whatever string comes back.

use colored::Colorize;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use secperf::money::{format_shares, Money};
use secperf::performance::{BatchOutcome, PerformanceRecord, ReportingInterval};
use secperf::utils::{format_amount, format_money, format_percent};

#[derive(Serialize)]
struct JsonRecord {
    security: String,
    name: String,
    currency: String,
    shares_held: String,
    fifo_cost: String,
    net_fifo_cost: String,
    fifo_cost_per_share: Option<String>,
    market_value: String,
    delta: String,
    realized_gain: String,
    fees: String,
    taxes: String,
    irr: f64,
    true_time_weighted_rate_of_return: f64,
    max_drawdown: f64,
    max_drawdown_duration_days: i64,
    volatility: f64,
    semi_volatility: f64,
    sum_of_dividends: String,
    dividend_event_count: usize,
    last_dividend_payment: Option<String>,
    periodicity: String,
    total_rate_of_return_div: f64,
}

#[derive(Serialize)]
struct JsonOutcome {
    security: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<JsonRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<&PerformanceRecord> for JsonRecord {
    fn from(r: &PerformanceRecord) -> Self {
        Self {
            security: r.security().id.clone(),
            name: r.security().name.clone(),
            currency: r.market_value().currency().to_string(),
            shares_held: format_shares(r.shares_held()),
            fifo_cost: r.fifo_cost().to_decimal().to_string(),
            net_fifo_cost: r.net_fifo_cost().to_decimal().to_string(),
            fifo_cost_per_share: r
                .fifo_cost_per_shares_held()
                .ok()
                .map(|m| m.to_decimal().to_string()),
            market_value: r.market_value().to_decimal().to_string(),
            delta: r.delta().to_decimal().to_string(),
            realized_gain: r.realized_gain().to_decimal().to_string(),
            fees: r.fees().to_decimal().to_string(),
            taxes: r.taxes().to_decimal().to_string(),
            irr: r.irr(),
            true_time_weighted_rate_of_return: r.true_time_weighted_rate_of_return(),
            max_drawdown: r.max_drawdown(),
            max_drawdown_duration_days: r.max_drawdown_duration(),
            volatility: r.volatility(),
            semi_volatility: r.semi_volatility(),
            sum_of_dividends: r.sum_of_dividends().to_decimal().to_string(),
            dividend_event_count: r.dividend_event_count(),
            last_dividend_payment: r.last_dividend_payment().map(|d| d.to_string()),
            periodicity: r.periodicity().to_string(),
            total_rate_of_return_div: r.total_rate_of_return_div(),
        }
    }
}

/// One entry per security, either its record or its error message
pub fn format_report_json(outcomes: &[BatchOutcome]) -> serde_json::Result<String> {
    let entries: Vec<JsonOutcome> = outcomes
        .iter()
        .map(|o| match &o.result {
            Ok(record) => JsonOutcome {
                security: o.security.id.clone(),
                record: Some(JsonRecord::from(record)),
                error: None,
            },
            Err(e) => JsonOutcome {
                security: o.security.id.clone(),
                record: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    serde_json::to_string_pretty(&entries)
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Security")]
    security: String,
    #[tabled(rename = "Shares")]
    shares: String,
    #[tabled(rename = "FIFO Cost")]
    fifo_cost: String,
    #[tabled(rename = "Market Value")]
    market_value: String,
    #[tabled(rename = "Delta")]
    delta: String,
    #[tabled(rename = "IRR")]
    irr: String,
    #[tabled(rename = "TTWROR")]
    ttwror: String,
    #[tabled(rename = "Max DD")]
    max_drawdown: String,
    #[tabled(rename = "Volatility")]
    volatility: String,
    #[tabled(rename = "Dividends")]
    dividends: String,
    #[tabled(rename = "Periodicity")]
    periodicity: String,
}

fn signed(text: String, negative: bool) -> String {
    if negative {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

impl From<&PerformanceRecord> for RecordRow {
    fn from(r: &PerformanceRecord) -> Self {
        Self {
            security: r.security().name.clone(),
            shares: format_shares(r.shares_held()),
            fifo_cost: format_amount(r.fifo_cost()),
            market_value: format_amount(r.market_value()),
            delta: signed(format_amount(r.delta()), r.delta().amount() < 0),
            irr: signed(format_percent(r.irr()), r.irr() < 0.0),
            ttwror: signed(
                format_percent(r.true_time_weighted_rate_of_return()),
                r.true_time_weighted_rate_of_return() < 0.0,
            ),
            max_drawdown: format_percent(r.max_drawdown()),
            volatility: format_percent(r.volatility()),
            dividends: format_amount(r.sum_of_dividends()),
            periodicity: r.periodicity().to_string(),
        }
    }
}

/// Table of successful records followed by one line per failed security
pub fn format_report_table(outcomes: &[BatchOutcome], interval: &ReportingInterval) -> String {
    let mut output = format!(
        "\n{} Security Performance\n  Period: {} → {}\n\n",
        "📈".cyan().bold(),
        interval.start,
        interval.end
    );

    let records: Vec<&PerformanceRecord> =
        outcomes.iter().filter_map(|o| o.result.as_ref().ok()).collect();

    if records.is_empty() {
        output.push_str(&format!("{} No records calculated\n", "ℹ".blue().bold()));
    } else {
        let rows: Vec<RecordRow> = records.iter().map(|r| RecordRow::from(*r)).collect();
        let mut table = Table::new(&rows);
        table.with(Style::rounded());
        // Right-align everything but the security name
        table.modify(Columns::new(1..), Alignment::right());
        output.push_str(&table.to_string());
        output.push('\n');

        if let Some(currency) = records.first().map(|r| r.market_value().currency()) {
            let total_delta: i64 = records.iter().map(|r| r.delta().amount()).sum();
            let total = Money::of(currency, total_delta);
            output.push_str(&format!(
                "\n{:<14} {}\n",
                "Total Delta:".bold(),
                signed(format_money(&total), total_delta < 0)
            ));
        }
    }

    for outcome in outcomes {
        if let Err(e) = &outcome.result {
            output.push_str(&format!(
                "{} {}: {}\n",
                "✗".red().bold(),
                outcome.security.id,
                e
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use secperf::config::PerformanceConfig;
    use secperf::index::CurveIndex;
    use secperf::model::{Security, Transaction, TransactionKind};
    use secperf::money::{RateTable, SHARE_FACTOR};
    use secperf::performance::calculate_all;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn outcomes() -> (Vec<BatchOutcome>, ReportingInterval) {
        let securities = vec![
            Security::new("ACME", "Acme Corp", "EUR"),
            Security::new("NOCURVE", "No Curve Inc", "EUR"),
        ];
        let mut transactions = Vec::new();
        for id in ["ACME", "NOCURVE"] {
            transactions.push(
                Transaction::new(id, date(2024, 1, 1), TransactionKind::Buy, Money::of("EUR", 100_000))
                    .with_shares(10 * SHARE_FACTOR),
            );
            transactions.push(Transaction::new(
                id,
                date(2024, 12, 31),
                TransactionKind::TerminalValuation,
                Money::of("EUR", 110_000),
            ));
        }
        let index = CurveIndex::new()
            .with_curve("ACME", &[(date(2024, 1, 1), 0.0), (date(2024, 12, 31), 0.1)]);
        let interval = ReportingInterval::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();

        let outcomes = calculate_all(
            &securities,
            &transactions,
            &RateTable::new("EUR"),
            &index,
            &interval,
            &PerformanceConfig::default(),
        );
        (outcomes, interval)
    }

    #[test]
    fn test_json_has_record_or_error_per_security() {
        let (outcomes, _) = outcomes();
        let json = format_report_json(&outcomes).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["record"]["delta"], "100.00");
        assert_eq!(entries[0]["record"]["shares_held"], "10");
        assert!(entries[0].get("error").is_none());
        assert!(entries[1]["error"]
            .as_str()
            .unwrap()
            .contains("performance index failed"));
    }

    #[test]
    fn test_table_lists_records_and_failures() {
        let (outcomes, interval) = outcomes();
        let table = format_report_table(&outcomes, &interval);

        assert!(table.contains("Acme Corp"));
        assert!(table.contains("1,100.00"));
        assert!(table.contains("NOCURVE"));
        assert!(table.contains("2024-01-01"));
    }
}
