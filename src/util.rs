// Utility helpers for numeric coercion, year keys and number formatting.
//
// The aggregator never fails on dirty cells; everything that needs to be
// forgiving about the dataset's text lives here.
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

static FOUR_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{4}").expect("valid regex"));

pub const FINANCIAL_YEAR_PREFIX: &str = "Financial Year (Apr - Mar), ";

/// Coerce a non-empty cell into a number, degrading to `0.0`.
///
/// - Trims surrounding whitespace; a blank cell is `0.0`.
/// - No thousands separators: `"1,200"` is not a number and yields `0.0`.
/// - NaN and infinities yield `0.0`.
pub fn parse_number_lenient(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// First run of four ASCII digits in a year label, or `""` when there is none.
///
/// `"Financial Year (Apr - Mar), 2001-2002"` gives `"2001"`.
pub fn year_key(label: &str) -> &str {
    FOUR_DIGITS.find(label).map(|m| m.as_str()).unwrap_or("")
}

/// Short label for display: `"Financial Year (Apr - Mar), 2001-2002"` becomes
/// `"2001-2002"`. Labels in any other format are returned unchanged.
pub fn short_year_label(label: &str) -> &str {
    label.strip_prefix(FINANCIAL_YEAR_PREFIX).unwrap_or(label)
}

pub fn average(v: &[f64]) -> f64 {
    // Returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Format with thousands separators and at most `max_fraction` decimals,
/// dropping trailing zeros (`1234.50` -> `1,234.5`, `7.00` -> `7`).
pub fn format_number(n: f64, max_fraction: usize) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let s = format!("{:.*}", max_fraction, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next().map(|f| f.trim_end_matches('0')).unwrap_or("");
    // Beyond u128 the digits are kept as-is, without separators.
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if !frac_part.is_empty() {
        res.push('.');
        res.push_str(frac_part);
    }
    // "-0" after rounding reads as noise.
    if n.is_sign_negative() && res != "0" {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
