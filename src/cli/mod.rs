use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod formatters;

#[derive(Parser)]
#[command(name = "secperf")]
#[command(
    version,
    about = "Per-security investment performance: IRR, TTWROR, FIFO cost, dividends"
)]
#[command(
    long_about = "Calculate per-security performance figures from CSV transaction files: money-weighted (IRR) and time-weighted returns, drawdown, volatility, FIFO cost basis, absolute gain and dividend regularity."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Configuration file (defaults to <config dir>/secperf/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Calculate a performance record for every security in a transaction file
    Report(ReportArgs),
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Transactions CSV: date,security,kind,amount,currency,shares,fees,taxes,note
    #[arg(short, long, value_name = "FILE")]
    pub transactions: PathBuf,

    /// Accumulated return curves CSV: date,security,accumulated
    #[arg(short = 'c', long, value_name = "FILE")]
    pub curves: PathBuf,

    /// Exchange rates CSV: date,currency,rate
    #[arg(short, long, value_name = "FILE")]
    pub rates: Option<PathBuf>,

    /// Reporting period: MTD, QTD, YTD, 1Y, ALL, YYYY or YYYY-MM-DD:YYYY-MM-DD
    #[arg(short, long, default_value = "ALL")]
    pub period: String,

    /// Reporting currency (overrides the configuration)
    #[arg(long)]
    pub currency: Option<String>,

    /// Only report this security id
    #[arg(short, long)]
    pub security: Option<String>,

    /// Reference date for relative periods (YYYY-MM-DD, defaults to today)
    #[arg(long, value_name = "DATE")]
    pub today: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "secperf",
            "report",
            "--transactions",
            "tx.csv",
            "--curves",
            "curves.csv",
            "--json",
            "--no-color",
        ])
        .unwrap();

        assert!(cli.json);
        assert!(cli.no_color);
        let Commands::Report(args) = cli.command;
        assert_eq!(args.period, "ALL");
        assert!(args.rates.is_none());
    }
}
