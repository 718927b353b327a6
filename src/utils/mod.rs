//! Formatting helpers for the command line output
//!
//! Amounts use `,` as thousands separator and `.` as decimal separator,
//! prefixed by the ISO currency code.

use rust_decimal::Decimal;

use crate::money::Money;

/// Whether the currency code is printed in front of the amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol<'a> {
    Code(&'a str),
    None,
}

/// Core formatting function with full control over output.
///
/// # Examples
/// ```
/// use secperf::utils::{format_amount_with_width, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     format_amount_with_width(dec!(1234.56), 0, CurrencySymbol::Code("EUR")),
///     "EUR 1,234.56"
/// );
///
/// assert_eq!(
///     format_amount_with_width(dec!(1234), 12, CurrencySymbol::None),
///     "    1,234.00"
/// );
/// ```
pub fn format_amount_with_width(value: Decimal, width: usize, symbol: CurrencySymbol) -> String {
    let is_negative = value < Decimal::ZERO;
    let formatted = format!("{:.2}", value.abs());
    let (integer_part, decimal_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    let result = match symbol {
        CurrencySymbol::Code(code) => {
            format!("{} {}{}.{}", code, sign, with_separators, decimal_part)
        }
        CurrencySymbol::None => format!("{}{}.{}", sign, with_separators, decimal_part),
    };

    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

/// "EUR 1,234.56"
pub fn format_money(money: &Money) -> String {
    format_amount_with_width(money.to_decimal(), 0, CurrencySymbol::Code(money.currency()))
}

/// Amount without the currency code: "1,234.56"
pub fn format_amount(money: &Money) -> String {
    format_amount_with_width(money.to_decimal(), 0, CurrencySymbol::None)
}

/// Fraction as a signed percentage with two decimals: 0.0523 -> "+5.23%"
pub fn format_percent(fraction: f64) -> String {
    if !fraction.is_finite() {
        return "n/a".to_string();
    }
    let percent = fraction * 100.0;
    if percent.abs() < 0.005 {
        "0.00%".to_string()
    } else {
        format!("{:+.2}%", percent)
    }
}
