//! Drawdown and volatility over an accumulated-return curve
//!
//! Curve points are `(date, accumulated)` where `accumulated` is the
//! return since the start of the curve as a fraction; the value at a point
//! is `1 + accumulated`.

use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Drawdown {
    /// Largest peak-to-trough decline as a fraction of the peak
    pub max_drawdown: f64,
    /// Longest span in days from a peak until it is regained (or the curve ends)
    pub max_drawdown_duration_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Volatility {
    /// Annualized standard deviation of log returns
    pub standard_deviation: f64,
    /// Annualized deviation of the negative log returns only
    pub semi_deviation: f64,
}

impl Drawdown {
    pub fn from_curve(points: &[(NaiveDate, f64)]) -> Self {
        let Some(&(first_date, first)) = points.first() else {
            return Self::default();
        };

        let mut peak_value = 1.0 + first;
        let mut peak_date = first_date;
        let mut underwater = false;
        let mut max_drawdown: f64 = 0.0;
        let mut longest = 0i64;

        for &(date, accumulated) in &points[1..] {
            let value = 1.0 + accumulated;
            if value >= peak_value {
                if underwater {
                    longest = longest.max((date - peak_date).num_days());
                    underwater = false;
                }
                peak_value = value;
                peak_date = date;
            } else {
                underwater = true;
                if peak_value > 0.0 {
                    max_drawdown = max_drawdown.max((peak_value - value) / peak_value);
                }
            }
        }

        if underwater {
            if let Some(&(last_date, _)) = points.last() {
                longest = longest.max((last_date - peak_date).num_days());
            }
        }

        Self {
            max_drawdown,
            max_drawdown_duration_days: longest,
        }
    }
}

impl Volatility {
    pub fn from_curve(points: &[(NaiveDate, f64)]) -> Self {
        let returns: Vec<f64> = points
            .iter()
            .map(|(_, accumulated)| 1.0 + accumulated)
            .tuple_windows()
            .filter(|(prev, next)| *prev > 0.0 && *next > 0.0)
            .map(|(prev, next)| (next / prev).ln())
            .collect();

        Self::from_returns(&returns)
    }

    pub fn from_returns(returns: &[f64]) -> Self {
        let n = returns.len();
        if n < 2 {
            return Self::default();
        }

        let mean = returns.iter().sum::<f64>() / n as f64;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let semi_variance =
            returns.iter().filter(|r| **r < 0.0).map(|r| r.powi(2)).sum::<f64>() / n as f64;

        let annualize = TRADING_DAYS_PER_YEAR.sqrt();
        Self {
            standard_deviation: variance.sqrt() * annualize,
            semi_deviation: semi_variance.sqrt() * annualize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn curve(values: &[f64]) -> Vec<(NaiveDate, f64)> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (start + chrono::Days::new(i as u64), *v))
            .collect()
    }

    #[test]
    fn test_drawdown_peak_to_trough_and_recovery() {
        // 1.0 -> 1.2 (peak, day 1) -> 0.9 (day 2) -> 1.2 (recovered, day 4)
        let points = curve(&[0.0, 0.2, -0.1, 0.05, 0.2, 0.3]);
        let dd = Drawdown::from_curve(&points);
        assert_abs_diff_eq!(dd.max_drawdown, 0.25, epsilon = 1e-12);
        assert_eq!(dd.max_drawdown_duration_days, 3);
    }

    #[test]
    fn test_drawdown_never_recovered_runs_to_end() {
        let points = curve(&[0.0, 0.1, 0.0, -0.05, 0.02]);
        let dd = Drawdown::from_curve(&points);
        assert_eq!(dd.max_drawdown_duration_days, 3);
        assert!(dd.max_drawdown > 0.13 && dd.max_drawdown < 0.14);
    }

    #[test]
    fn test_rising_curve_has_no_drawdown() {
        let dd = Drawdown::from_curve(&curve(&[0.0, 0.01, 0.02, 0.03]));
        assert_eq!(dd, Drawdown::default());
        assert_eq!(Drawdown::from_curve(&[]), Drawdown::default());
    }

    #[test]
    fn test_volatility_of_constant_growth_is_zero() {
        let points: Vec<f64> = (0..10).map(|i| 1.01f64.powi(i) - 1.0).collect();
        let vol = Volatility::from_curve(&curve(&points));
        assert_abs_diff_eq!(vol.standard_deviation, 0.0, epsilon = 1e-9);
        assert_eq!(vol.semi_deviation, 0.0);
    }

    #[test]
    fn test_semi_deviation_only_counts_losses() {
        let returns = [0.01, -0.02, 0.03, -0.01];
        let vol = Volatility::from_returns(&returns);
        let expected_semi = ((0.0004 + 0.0001) / 4.0f64).sqrt() * 252f64.sqrt();
        assert_abs_diff_eq!(vol.semi_deviation, expected_semi, epsilon = 1e-12);
        assert!(vol.standard_deviation > vol.semi_deviation);
    }

    #[test]
    fn test_too_few_returns_yield_zero() {
        assert_eq!(Volatility::from_returns(&[0.05]), Volatility::default());
        assert_eq!(Volatility::from_curve(&curve(&[0.0])), Volatility::default());
    }
}
