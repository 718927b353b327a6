use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use super::{Drawdown, IndexError, IndexSummary, PerformanceIndexBuilder, Volatility};
use crate::model::Security;
use crate::money::CurrencyConverter;
use crate::performance::ReportingInterval;

/// Performance index backed by precomputed accumulated-return curves, one
/// per security id. Curves are expected in the reporting currency.
#[derive(Debug, Clone, Default)]
pub struct CurveIndex {
    curves: HashMap<String, Vec<(NaiveDate, f64)>>,
}

impl CurveIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the point of `security` on `date`
    pub fn add_point(&mut self, security: &str, date: NaiveDate, accumulated: f64) {
        let curve = self.curves.entry(security.to_string()).or_default();
        match curve.binary_search_by_key(&date, |(d, _)| *d) {
            Ok(idx) => curve[idx].1 = accumulated,
            Err(idx) => curve.insert(idx, (date, accumulated)),
        }
    }

    pub fn with_curve(mut self, security: &str, points: &[(NaiveDate, f64)]) -> Self {
        for (date, accumulated) in points {
            self.add_point(security, *date, *accumulated);
        }
        self
    }

    pub fn curve(&self, security: &str) -> Option<&[(NaiveDate, f64)]> {
        self.curves.get(security).map(Vec::as_slice)
    }

    /// Points inside the interval, rebased so the first one is 0%
    fn rebased(
        &self,
        security: &Security,
        interval: &ReportingInterval,
    ) -> Result<Vec<(NaiveDate, f64)>, IndexError> {
        let curve = self.curve(&security.id).ok_or_else(|| {
            IndexError::MissingData(format!("no return curve for {}", security.id))
        })?;

        let points: Vec<(NaiveDate, f64)> = curve
            .iter()
            .filter(|(date, _)| interval.contains(*date))
            .copied()
            .collect();

        let Some(&(_, first)) = points.first() else {
            return Err(IndexError::MissingData(format!(
                "no curve points for {} between {} and {}",
                security.id, interval.start, interval.end
            )));
        };

        let base = 1.0 + first;
        if base <= 0.0 {
            return Err(IndexError::Computation(format!(
                "curve for {} starts at a total loss",
                security.id
            )));
        }

        Ok(points
            .into_iter()
            .map(|(date, accumulated)| (date, (1.0 + accumulated) / base - 1.0))
            .collect())
    }
}

impl PerformanceIndexBuilder for CurveIndex {
    fn build(
        &self,
        security: &Security,
        interval: &ReportingInterval,
        _converter: &dyn CurrencyConverter,
    ) -> Result<IndexSummary, IndexError> {
        let points = self.rebased(security, interval)?;
        debug!(
            "Index for {}: {} curve points in {}..{}",
            security.id,
            points.len(),
            interval.start,
            interval.end
        );

        Ok(IndexSummary {
            final_accumulated_percentage: points.last().map(|(_, a)| *a).unwrap_or(0.0),
            drawdown: Drawdown::from_curve(&points),
            volatility: Volatility::from_curve(&points),
        })
    }
}
