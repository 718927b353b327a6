use std::fmt;

use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::convert_at;
use crate::config::{GapAggregation, PeriodicityConfig};
use crate::error::Result;
use crate::model::{Transaction, TransactionKind};
use crate::money::{CurrencyConverter, Money};

/// Regularity of dividend payments, ordered for sorting
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Periodicity {
    #[default]
    Unknown,
    None,
    Indefinite,
    Annual,
    SemiAnnual,
    Quarterly,
    Irregular,
}

impl Periodicity {
    pub fn sort_key(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Periodicity::Unknown => "Unknown",
            Periodicity::None => "None",
            Periodicity::Indefinite => "Indefinite",
            Periodicity::Annual => "Annual",
            Periodicity::SemiAnnual => "Semiannual",
            Periodicity::Quarterly => "Quarterly",
            Periodicity::Irregular => "Irregular",
        }
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DividendEvent {
    pub date: NaiveDate,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DividendSummary {
    pub sum: Money,
    pub event_count: usize,
    pub last_payment: Option<NaiveDate>,
    pub periodicity: Periodicity,
}

/// Sum, count and cadence of the dividend transactions in `transactions`,
/// which must already be in date order.
pub fn calculate_dividends(
    transactions: &[Transaction],
    converter: &dyn CurrencyConverter,
    config: &PeriodicityConfig,
) -> Result<DividendSummary> {
    let mut events = Vec::new();
    for tx in transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Dividend)
    {
        events.push(DividendEvent {
            date: tx.date,
            amount: convert_at(converter, tx.date, &tx.amount)?,
        });
    }

    let dates: Vec<NaiveDate> = events.iter().map(|e| e.date).collect();

    Ok(DividendSummary {
        sum: Money::of(
            converter.term_currency(),
            events.iter().map(|e| e.amount).sum(),
        ),
        event_count: events.len(),
        last_payment: dates.iter().max().copied(),
        periodicity: classify_periodicity(&dates, config),
    })
}

/// Classify payment dates by the gaps between distinct dates.
///
/// The typical gap picks a band; the band wins when enough of the gaps
/// agree with it. Gaps that all match some cadence but disagree with each
/// other yield `Unknown`; anything else is `Irregular`.
pub fn classify_periodicity(dates: &[NaiveDate], config: &PeriodicityConfig) -> Periodicity {
    let distinct: Vec<NaiveDate> = dates.iter().copied().sorted().dedup().collect();

    match distinct.len() {
        0 => return Periodicity::None,
        1 => return Periodicity::Indefinite,
        _ => {}
    }

    let gaps: Vec<f64> = distinct
        .iter()
        .tuple_windows()
        .map(|(a, b)| (*b - *a).num_days() as f64)
        .collect();

    let bands = config.bands();
    let cadences = [
        Periodicity::Quarterly,
        Periodicity::SemiAnnual,
        Periodicity::Annual,
    ];
    let band_of = |gap: f64| {
        bands
            .iter()
            .position(|(_, lower, upper)| gap >= *lower && gap <= *upper)
    };

    let gap_bands: Vec<Option<usize>> = gaps.iter().map(|g| band_of(*g)).collect();

    if let Some(band) = band_of(typical_gap(&gaps, config.aggregation)) {
        let matching = gap_bands.iter().filter(|b| **b == Some(band)).count();
        if matching as f64 / gaps.len() as f64 >= config.min_consistency {
            return cadences[band];
        }
    }

    let all_banded = gap_bands.iter().all(Option::is_some);
    let distinct_bands = gap_bands.iter().flatten().unique().count();
    if all_banded && distinct_bands >= 2 {
        Periodicity::Unknown
    } else {
        Periodicity::Irregular
    }
}

fn typical_gap(gaps: &[f64], aggregation: GapAggregation) -> f64 {
    match aggregation {
        GapAggregation::Mean => gaps.iter().sum::<f64>() / gaps.len() as f64,
        GapAggregation::Median => {
            let sorted: Vec<f64> = gaps.iter().copied().sorted_by(f64::total_cmp).collect();
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 0 {
                (sorted[mid - 1] + sorted[mid]) / 2.0
            } else {
                sorted[mid]
            }
        }
    }
}
