use tracing::warn;

use super::ReportingInterval;
use crate::error::{PerformanceError, Result};
use crate::index::{IndexSummary, PerformanceIndexBuilder};
use crate::model::Security;
use crate::money::CurrencyConverter;

/// Time-weighted return, drawdown and volatility as reported by the index.
/// Any index failure fails the whole record.
pub fn calculate_risk(
    security: &Security,
    interval: &ReportingInterval,
    converter: &dyn CurrencyConverter,
    index: &dyn PerformanceIndexBuilder,
) -> Result<IndexSummary> {
    index.build(security, interval, converter).map_err(|e| {
        warn!("Performance index failed for {}: {}", security.id, e);
        PerformanceError::ExternalIndexFailure(e.to_string())
    })
}
