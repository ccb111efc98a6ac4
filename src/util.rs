// Utility helpers for lenient numeric coercion and number formatting.
//
// This module centralizes all the "dirty" value handling so the rest of the
// code can assume clean, typed values.
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

// First signed decimal substring, e.g. "-1,234.50 php" -> "-1234.50" after
// the separators are stripped.
static FIRST_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-+]?[0-9]*\.?[0-9]+").expect("valid number pattern"));

/// Coerce a raw export cell into `f64` using the lenient policy: strip
/// thousands-separator commas and the peso glyph, take the first signed
/// decimal substring, and default to `0.0` when nothing parses.
///
/// Unparsable cells are never an error; real-world exports routinely carry
/// placeholders like `"-"` or `"N/A"` in numeric columns.
pub fn parse_money_lenient(s: &str) -> f64 {
    let cleaned = s.replace(',', "").replace('₱', "");
    FIRST_NUMBER
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Arithmetic mean of the finite values in `v`; values that are infinite or
/// NaN are excluded so a single zero-margin row cannot blow up a reported
/// average. Returns 0 when no finite value exists.
pub fn finite_mean(v: &[f64]) -> f64 {
    let finite: Vec<f64> = v.iter().copied().filter(|x| x.is_finite()).collect();
    if finite.is_empty() {
        return 0.0;
    }
    let sum: f64 = finite.iter().sum();
    sum / finite.len() as f64
}

/// Format a floating-point value with a fixed number of decimal places and
/// locale-aware thousands separators (e.g., `1,234,567.89`). Non-finite
/// values render as `INF` so they stay legible in reports.
pub fn format_number(n: f64, decimals: usize) -> String {
    if !n.is_finite() {
        return "INF".to_string();
    }
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts in console messages.
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_parse_strips_currency_and_separators() {
        assert_eq!(parse_money_lenient("₱1,234.50"), 1234.50);
        assert_eq!(parse_money_lenient("  2,000 "), 2000.0);
        assert_eq!(parse_money_lenient("-3.5"), -3.5);
    }

    #[test]
    fn lenient_parse_takes_first_number_substring() {
        assert_eq!(parse_money_lenient("ROAS 4.20 (est)"), 4.20);
        assert_eq!(parse_money_lenient("12 items of 99"), 12.0);
    }

    #[test]
    fn lenient_parse_defaults_to_zero() {
        assert_eq!(parse_money_lenient(""), 0.0);
        assert_eq!(parse_money_lenient("N/A"), 0.0);
        assert_eq!(parse_money_lenient("-"), 0.0);
    }

    #[test]
    fn finite_mean_skips_infinity() {
        assert_eq!(finite_mean(&[1.0, 3.0, f64::INFINITY]), 2.0);
        assert_eq!(finite_mean(&[f64::INFINITY]), 0.0);
        assert_eq!(finite_mean(&[]), 0.0);
    }

    #[test]
    fn format_number_handles_infinity_and_sign() {
        assert_eq!(format_number(f64::INFINITY, 2), "INF");
        assert_eq!(format_number(-1234.5, 2), "-1,234.50");
        assert_eq!(format_number(1000000.0, 0), "1,000,000");
    }
}
