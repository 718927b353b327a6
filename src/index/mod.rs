//! Performance index capability
//!
//! The engine does not build sub-period return curves itself. It asks a
//! [`PerformanceIndexBuilder`] for the final time-weighted return and the
//! drawdown and volatility summaries of a security over a period.
//! [`CurveIndex`] implements the capability over caller-supplied
//! accumulated-return curves.

use serde::Serialize;
use thiserror::Error;

use crate::model::Security;
use crate::money::CurrencyConverter;
use crate::performance::ReportingInterval;

pub mod curve;
pub mod risk;

pub use curve::CurveIndex;
pub use risk::{Drawdown, Volatility};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("missing data: {0}")]
    MissingData(String),

    #[error("computation failed: {0}")]
    Computation(String),
}

/// What the index reports for one security and period
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct IndexSummary {
    /// True time-weighted rate of return as a fraction (0.05 = +5%)
    pub final_accumulated_percentage: f64,
    pub drawdown: Drawdown,
    pub volatility: Volatility,
}

pub trait PerformanceIndexBuilder: Send + Sync {
    fn build(
        &self,
        security: &Security,
        interval: &ReportingInterval,
        converter: &dyn CurrencyConverter,
    ) -> Result<IndexSummary, IndexError>;
}
