use tracing::{info, warn};

use super::record::{PerformanceRecord, RecordBuilder};
use super::ReportingInterval;
use crate::config::PerformanceConfig;
use crate::error::Result;
use crate::index::PerformanceIndexBuilder;
use crate::model::{Security, Transaction};
use crate::money::CurrencyConverter;

/// Result of one security in a batch
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub security: Security,
    pub result: Result<PerformanceRecord>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Calculate a record per security, in the order given.
///
/// A failing security is reported in its outcome and does not stop the
/// remaining ones.
pub fn calculate_all(
    securities: &[Security],
    transactions: &[Transaction],
    converter: &dyn CurrencyConverter,
    index: &dyn PerformanceIndexBuilder,
    interval: &ReportingInterval,
    config: &PerformanceConfig,
) -> Vec<BatchOutcome> {
    let outcomes: Vec<BatchOutcome> = securities
        .iter()
        .map(|security| {
            let builder = RecordBuilder::from_transactions(security.clone(), transactions, interval);
            let result = builder.calculate(converter, index, interval, config);
            if let Err(e) = &result {
                warn!("Skipping {}: {}", security.id, e);
            }
            BatchOutcome {
                security: security.clone(),
                result,
            }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    info!(
        "Calculated {} securities, {} failed",
        outcomes.len(),
        failed
    );
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PerformanceError;
    use crate::index::CurveIndex;
    use crate::model::TransactionKind;
    use crate::money::{Money, RateTable, SHARE_FACTOR};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(security: &str, date: NaiveDate, kind: TransactionKind, shares: i64, amount: i64) -> Transaction {
        Transaction::new(security, date, kind, Money::of("EUR", amount))
            .with_shares(shares * SHARE_FACTOR)
    }

    #[test]
    fn test_one_failure_does_not_abort_the_batch() {
        let securities = vec![
            Security::new("BAD", "Oversold", "EUR"),
            Security::new("GOOD", "Fine", "EUR"),
        ];
        let transactions = vec![
            tx("BAD", date(2024, 1, 1), TransactionKind::Buy, 1, 1_000),
            tx("BAD", date(2024, 2, 1), TransactionKind::Sell, 2, 2_000),
            tx("GOOD", date(2024, 1, 1), TransactionKind::Buy, 1, 1_000),
            tx("GOOD", date(2024, 12, 31), TransactionKind::TerminalValuation, 0, 1_100),
        ];
        let index = CurveIndex::new()
            .with_curve("BAD", &[(date(2024, 1, 1), 0.0)])
            .with_curve("GOOD", &[(date(2024, 1, 1), 0.0), (date(2024, 12, 31), 0.1)]);
        let interval = ReportingInterval::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();

        let outcomes = calculate_all(
            &securities,
            &transactions,
            &RateTable::new("EUR"),
            &index,
            &interval,
            &PerformanceConfig::default(),
        );

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].security.id, "BAD");
        assert!(matches!(
            outcomes[0].result,
            Err(PerformanceError::OversoldInventory { .. })
        ));
        let good = outcomes[1].result.as_ref().unwrap();
        assert_eq!(good.delta(), &Money::of("EUR", 100));
    }
}
