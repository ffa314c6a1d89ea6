// Utility helpers for parsing and number formatting.
//
// This module centralizes all the "dirty" CSV/number handling so the
// rest of the code can assume clean, typed values.
use crate::period::Period;
use num_format::{Locale, ToFormattedString};

/// Characters used as thousands separators in spreadsheet exports: plain
/// spaces, non-breaking spaces and narrow non-breaking spaces.
const SPACE_SEPARATORS: [char; 3] = [' ', '\u{a0}', '\u{202f}'];

/// Parse a measure cell, removing whitespace thousands separators first.
///
/// Returns `None` for empty or unparseable cells; the caller decides whether
/// that means zero.
pub fn parse_measure(s: Option<&str>) -> Option<f64> {
    let cleaned: String = s?.chars().filter(|c| !SPACE_SEPARATORS.contains(c)).collect();
    if cleaned.is_empty() {
        return None;
    }
    let v = cleaned.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

/// Like [`parse_measure`] but also strips `,` separators, as used in the
/// hand-maintained target sheet (`1,250`).
pub fn parse_count(s: Option<&str>) -> Option<f64> {
    let s = s?.replace(',', "");
    parse_measure(Some(&s))
}

/// Parse the combined `YYYYMM` column. Spreadsheet exports sometimes write
/// it as a float (`202510.0`), which is accepted when it has no fraction.
pub fn parse_year_month(s: Option<&str>) -> Option<Period> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let value = match s.parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            let f = s.parse::<f64>().ok()?;
            if f.fract() != 0.0 || !f.is_finite() {
                return None;
            }
            f as i64
        }
    };
    Period::from_year_month(value)
}

/// Trimmed, non-empty categorical value.
pub fn clean_label(s: Option<String>) -> Option<String> {
    let s = s?.trim().to_string();
    (!s.is_empty()).then_some(s)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let s = format!("{:.*}", decimals, n.abs());
    // Only keep the minus sign if something non-zero survived rounding.
    let neg = n < 0.0 && s.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
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
    n.to_formatted_string(&Locale::en)
}

/// Explicitly signed number with separators: `+1,234.5`, `-12`, `+0`.
pub fn format_signed(n: f64, decimals: usize) -> String {
    let body = format_number(n, decimals);
    if body.starts_with('-') {
        body
    } else {
        format!("+{}", body)
    }
}

/// Signed percentage with one decimal: `+12.3%`.
pub fn format_signed_percent(n: f64) -> String {
    format!("{}%", format_signed(n, 1))
}

/// Signed percentage-point difference with two decimals: `-0.45pp`.
pub fn format_points(n: f64) -> String {
    format!("{}pp", format_signed(n, 2))
}

/// Currency amount rounded to whole kronor: `1,234,567 kr`.
pub fn format_money(n: f64) -> String {
    format!("{} kr", format_number(n, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_space_separators() {
        assert_eq!(parse_measure(Some("1 234")), Some(1234.0));
        assert_eq!(parse_measure(Some("12\u{a0}345,")), None);
        assert_eq!(parse_measure(Some("12\u{a0}345.5")), Some(12345.5));
        assert_eq!(parse_measure(Some("-3\u{202f}000")), Some(-3000.0));
        assert_eq!(parse_measure(Some("  ")), None);
        assert_eq!(parse_measure(Some("n/a")), None);
        assert_eq!(parse_measure(None), None);
    }

    #[test]
    fn count_strips_commas_too() {
        assert_eq!(parse_count(Some("1,250")), Some(1250.0));
        assert_eq!(parse_count(Some("1\u{a0}250")), Some(1250.0));
    }

    #[test]
    fn year_month_accepts_float_exports() {
        assert_eq!(parse_year_month(Some("202510")), Some(Period { year: 2025, month: 10 }));
        assert_eq!(parse_year_month(Some("202510.0")), Some(Period { year: 2025, month: 10 }));
        assert_eq!(parse_year_month(Some("202510.5")), None);
        assert_eq!(parse_year_month(Some("oktober")), None);
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1234.6, 0), "-1,235");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_money(1000.4), "1,000 kr");
    }

    #[test]
    fn signed_formats() {
        assert_eq!(format_signed_percent(12.345), "+12.3%");
        assert_eq!(format_signed_percent(-5.0), "-5.0%");
        assert_eq!(format_signed_percent(0.0), "+0.0%");
        assert_eq!(format_points(-0.456), "-0.46pp");
        assert_eq!(format_signed(1500.0, 0), "+1,500");
    }
}
