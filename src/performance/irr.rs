//! Money-weighted return (internal rate of return)
//!
//! Solves `Σ CF_i / (1 + r)^(t_i)` = 0 where `t_i` is the distance in years
//! (days / 365) from the first cash flow. Newton-Raphson does the work; when
//! it stalls or leaves the domain the solver falls back to bisection on a
//! bracket with a sign change.

use chrono::NaiveDate;
use tracing::debug;

use super::convert_at;
use crate::config::SolverConfig;
use crate::error::{PerformanceError, Result};
use crate::model::Transaction;
use crate::money::CurrencyConverter;

const DAYS_PER_YEAR: f64 = 365.0;
const MIN_RATE: f64 = -0.999_999;

/// Candidate rates scanned for a sign change before bisecting
const BRACKET_GRID: [f64; 14] = [
    MIN_RATE, -0.99, -0.9, -0.5, -0.1, 0.0, 0.1, 0.5, 1.0, 5.0, 10.0, 100.0, 1e3, 1e6,
];

/// Signed cash flow in minor units of the reporting currency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverMethod {
    Newton,
    Bisection,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrrSolution {
    pub rate: f64,
    pub iterations: usize,
    pub method: SolverMethod,
}

/// Cash flows from the investor's point of view: money paid in for
/// inbound transactions is negative, proceeds, dividends and the terminal
/// valuation are positive. Zero flows are dropped.
pub fn collect_cash_flows(
    transactions: &[Transaction],
    converter: &dyn CurrencyConverter,
) -> Result<Vec<CashFlow>> {
    let mut flows = Vec::with_capacity(transactions.len());
    for tx in transactions {
        let amount = convert_at(converter, tx.date, &tx.amount)?;
        let signed = if tx.kind.is_inbound() { -amount } else { amount };
        if signed != 0 {
            flows.push(CashFlow {
                date: tx.date,
                amount: signed,
            });
        }
    }
    Ok(flows)
}

/// IRR of the flows, 0.0 when there are none
pub fn calculate_irr(flows: &[CashFlow], config: &SolverConfig) -> Result<f64> {
    if flows.iter().all(|f| f.amount == 0) {
        return Ok(0.0);
    }
    solve_irr(flows, config).map(|s| s.rate)
}

pub fn solve_irr(flows: &[CashFlow], config: &SolverConfig) -> Result<IrrSolution> {
    let series = to_series(flows);

    let has_inflow = series.iter().any(|(cf, _)| *cf > 0.0);
    let has_outflow = series.iter().any(|(cf, _)| *cf < 0.0);
    if !(has_inflow && has_outflow) {
        return Err(PerformanceError::NonConvergence {
            iterations: 0,
            reason: "cash flows do not change sign".to_string(),
        });
    }
    if series.iter().all(|(_, years)| *years == 0.0) {
        return Err(PerformanceError::NonConvergence {
            iterations: 0,
            reason: "all cash flows share one date".to_string(),
        });
    }

    if let Some(solution) = newton(&series, config) {
        return Ok(solution);
    }

    debug!("IRR: Newton-Raphson did not converge, falling back to bisection");
    bisection(&series, config)
}

fn to_series(flows: &[CashFlow]) -> Vec<(f64, f64)> {
    let Some(first) = flows.iter().map(|f| f.date).min() else {
        return Vec::new();
    };
    flows
        .iter()
        .filter(|f| f.amount != 0)
        .map(|f| {
            let years = (f.date - first).num_days() as f64 / DAYS_PER_YEAR;
            (f.amount as f64, years)
        })
        .collect()
}

/// NPV and its derivative with respect to the rate
fn npv_and_derivative(series: &[(f64, f64)], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;
    for (cf, years) in series {
        let discount = (1.0 + rate).powf(*years);
        npv += cf / discount;
        // d/dr [cf / (1+r)^t] = -t * cf / (1+r)^(t+1)
        dnpv -= years * cf / (discount * (1.0 + rate));
    }
    (npv, dnpv)
}

fn npv(series: &[(f64, f64)], rate: f64) -> f64 {
    npv_and_derivative(series, rate).0
}

fn newton(series: &[(f64, f64)], config: &SolverConfig) -> Option<IrrSolution> {
    let mut rate = config.initial_guess;

    for iteration in 0..config.max_iterations {
        let (value, derivative) = npv_and_derivative(series, rate);
        if !value.is_finite() || !derivative.is_finite() || derivative.abs() < f64::EPSILON {
            return None;
        }
        if value.abs() < config.tolerance {
            return Some(IrrSolution {
                rate,
                iterations: iteration,
                method: SolverMethod::Newton,
            });
        }

        let mut next = rate - value / derivative;
        if !next.is_finite() {
            return None;
        }
        if next <= -1.0 {
            // stay inside the domain: move halfway towards -1
            next = (rate - 1.0) / 2.0;
        }

        if (next - rate).abs() < config.tolerance {
            return Some(IrrSolution {
                rate: next,
                iterations: iteration + 1,
                method: SolverMethod::Newton,
            });
        }
        rate = next;
    }

    None
}

fn find_bracket(series: &[(f64, f64)], guess: f64) -> Option<(f64, f64)> {
    let mut grid: Vec<f64> = BRACKET_GRID.to_vec();
    if guess > MIN_RATE {
        grid.push(guess);
    }
    grid.sort_by(f64::total_cmp);

    grid.windows(2).find_map(|pair| {
        let (lo, hi) = (pair[0], pair[1]);
        let (f_lo, f_hi) = (npv(series, lo), npv(series, hi));
        if f_lo.is_finite() && f_hi.is_finite() && f_lo.signum() != f_hi.signum() {
            Some((lo, hi))
        } else {
            None
        }
    })
}

fn bisection(series: &[(f64, f64)], config: &SolverConfig) -> Result<IrrSolution> {
    let (mut lo, mut hi) =
        find_bracket(series, config.initial_guess).ok_or_else(|| {
            PerformanceError::NonConvergence {
                iterations: config.max_iterations,
                reason: "no bracketing interval found".to_string(),
            }
        })?;
    let mut f_lo = npv(series, lo);

    for iteration in 0..config.max_iterations {
        let mid = 0.5 * (lo + hi);
        let f_mid = npv(series, mid);

        if f_mid.abs() < config.tolerance || (hi - lo) < config.tolerance {
            return Ok(IrrSolution {
                rate: mid,
                iterations: iteration + 1,
                method: SolverMethod::Bisection,
            });
        }

        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }

    Err(PerformanceError::NonConvergence {
        iterations: config.max_iterations,
        reason: format!("bisection interval [{}, {}] still too wide", lo, hi),
    })
}
