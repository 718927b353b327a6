//! Routes parsed commands to their handlers

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use tracing::info;

use crate::cli::{formatters, Commands, ReportArgs};
use secperf::config::PerformanceConfig;
use secperf::importers;
use secperf::money::RateTable;
use secperf::performance::{calculate_all, ReportingPeriod};

pub fn dispatch_command(command: Commands, config_path: Option<&Path>, json_output: bool) -> Result<()> {
    match command {
        Commands::Report(args) => dispatch_report(args, config_path, json_output),
    }
}

fn dispatch_report(args: ReportArgs, config_path: Option<&Path>, json_output: bool) -> Result<()> {
    let mut config =
        PerformanceConfig::load_or_default(config_path).context("Failed to load configuration")?;
    if let Some(currency) = &args.currency {
        config.reporting_currency = currency.trim().to_uppercase();
        config.validate()?;
    }

    let transactions = importers::load_transactions(&args.transactions)
        .with_context(|| format!("Failed to read transactions from {:?}", args.transactions))?;
    let index = importers::load_curves(&args.curves)
        .with_context(|| format!("Failed to read return curves from {:?}", args.curves))?;
    let rates = match &args.rates {
        Some(path) => importers::load_rates(path, &config.reporting_currency)
            .with_context(|| format!("Failed to read exchange rates from {:?}", path))?,
        None => RateTable::new(config.reporting_currency.clone()),
    };

    let today = match &args.today {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .with_context(|| format!("Invalid --today date: {}. Use YYYY-MM-DD format.", text))?,
        None => Local::now().date_naive(),
    };
    let period: ReportingPeriod = args.period.parse()?;
    let first_transaction = transactions.iter().map(|tx| tx.date).min();
    let interval = period.resolve(today, first_transaction)?;

    let mut securities = importers::securities_from_transactions(&transactions);
    if let Some(id) = &args.security {
        securities.retain(|s| &s.id == id);
        if securities.is_empty() {
            bail!("No transactions for security {}", id);
        }
    }

    info!(
        "Reporting {} securities in {} for {}..{}",
        securities.len(),
        config.reporting_currency,
        interval.start,
        interval.end
    );

    let outcomes = calculate_all(&securities, &transactions, &rates, &index, &interval, &config);

    if json_output {
        println!("{}", formatters::format_report_json(&outcomes)?);
    } else {
        print!("{}", formatters::format_report_table(&outcomes, &interval));
    }
    Ok(())
}
