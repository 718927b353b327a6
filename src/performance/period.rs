use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{PerformanceError, Result};

/// Named reporting periods, resolved against a reference date
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportingPeriod {
    Mtd,     // Month-to-date
    Qtd,     // Quarter-to-date
    Ytd,     // Year-to-date
    OneYear, // Last 365 days
    AllTime, // Since first transaction
    Year(i32),
    Custom { from: NaiveDate, to: NaiveDate },
}

/// Closed date interval; both ends are part of the period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportingInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(PerformanceError::Parse(format!(
                "period start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl ReportingPeriod {
    /// Resolve to a concrete interval ending at `today` (or the custom end).
    /// `first_transaction` anchors `AllTime`; without it the interval starts
    /// at `today`.
    pub fn resolve(
        &self,
        today: NaiveDate,
        first_transaction: Option<NaiveDate>,
    ) -> Result<ReportingInterval> {
        let invalid = |what: &str| PerformanceError::Parse(format!("invalid {}", what));

        match self {
            ReportingPeriod::Mtd => {
                let start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
                    .ok_or_else(|| invalid("current month"))?;
                ReportingInterval::new(start, today)
            }
            ReportingPeriod::Qtd => {
                let quarter_start_month = ((today.month() - 1) / 3) * 3 + 1;
                let start = NaiveDate::from_ymd_opt(today.year(), quarter_start_month, 1)
                    .ok_or_else(|| invalid("quarter start"))?;
                ReportingInterval::new(start, today)
            }
            ReportingPeriod::Ytd => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1)
                    .ok_or_else(|| invalid("year start"))?;
                ReportingInterval::new(start, today)
            }
            ReportingPeriod::OneYear => {
                let start = today
                    .checked_sub_days(chrono::Days::new(365))
                    .ok_or_else(|| invalid("one-year start"))?;
                ReportingInterval::new(start, today)
            }
            ReportingPeriod::AllTime => {
                let start = first_transaction.unwrap_or(today).min(today);
                ReportingInterval::new(start, today)
            }
            ReportingPeriod::Year(year) => {
                let start =
                    NaiveDate::from_ymd_opt(*year, 1, 1).ok_or_else(|| invalid("year"))?;
                let end =
                    NaiveDate::from_ymd_opt(*year, 12, 31).ok_or_else(|| invalid("year"))?;
                ReportingInterval::new(start, end)
            }
            ReportingPeriod::Custom { from, to } => ReportingInterval::new(*from, *to),
        }
    }
}

impl FromStr for ReportingPeriod {
    type Err = PerformanceError;

    /// Accepts MTD, QTD, YTD, 1Y, ALL, YYYY, or YYYY-MM-DD:YYYY-MM-DD
    fn from_str(period: &str) -> Result<Self> {
        let upper = period.trim().to_uppercase();
        match upper.as_str() {
            "MTD" => Ok(ReportingPeriod::Mtd),
            "QTD" => Ok(ReportingPeriod::Qtd),
            "YTD" => Ok(ReportingPeriod::Ytd),
            "1Y" | "ONEYEAR" => Ok(ReportingPeriod::OneYear),
            "ALL" | "ALLTIME" => Ok(ReportingPeriod::AllTime),
            _ => {
                if let Ok(year) = upper.parse::<i32>() {
                    if (1900..=2100).contains(&year) {
                        return Ok(ReportingPeriod::Year(year));
                    }
                }

                let (from_str, to_str) = upper.split_once(':').ok_or_else(|| {
                    PerformanceError::Parse(format!(
                        "invalid period '{}'. Use: MTD, QTD, YTD, 1Y, ALL, YYYY, or from:to (YYYY-MM-DD:YYYY-MM-DD)",
                        period
                    ))
                })?;
                let parse = |s: &str| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                        PerformanceError::Parse(format!(
                            "invalid date: {}. Use YYYY-MM-DD format.",
                            s
                        ))
                    })
                };
                let from = parse(from_str)?;
                let to = parse(to_str)?;
                if from > to {
                    return Err(PerformanceError::Parse(
                        "custom period 'from' must be <= 'to'".to_string(),
                    ));
                }
                Ok(ReportingPeriod::Custom { from, to })
            }
        }
    }
}
