// Helpers for parsing CSV cells and formatting numbers for the console.
//
// Cell parsing is forgiving about the usual export noise (padding, thousands
// separators) but never guesses: anything else comes back as `None` and the
// caller decides whether that is a warning or an error.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};
use std::fmt::Display;

/// Parse a numeric cell.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters (`"n/a"`, `"1e3"`).
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for blank or unparseable cells.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i32>().ok()
}

/// Parse a date cell with an explicit `chrono` format such as `%d/%m/%y`.
///
/// Two-digit years follow the POSIX pivot: 69-99 are 19xx, 00-68 are 20xx.
pub fn parse_date_safe(s: Option<&str>, format: &str) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, format).ok()
}

/// Percentage `100 * num / den`, undefined when the denominator is zero.
pub fn percent(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 {
        return None;
    }
    let v = num * 100.0 / den;
    v.is_finite().then_some(v)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale thousands separators, e.g. `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
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

// `tabled` display hooks. Undefined metrics render as `-` so gaps stay visible.

pub fn display_metric(v: &Option<f64>) -> String {
    match v {
        Some(v) => format_number(*v, 2),
        None => "-".to_string(),
    }
}

pub fn display_sales(v: &f64) -> String {
    format_number(*v, 0)
}

pub fn display_optional_sales(v: &Option<f64>) -> String {
    match v {
        Some(v) => format_number(*v, 0),
        None => "-".to_string(),
    }
}

pub fn display_optional<T: Display>(v: &Option<T>) -> String {
    match v {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_tolerate_separators_but_not_text() {
        assert_eq!(parse_f64_safe(Some(" 1,234 ")), Some(1234.0));
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn two_digit_years_pivot() {
        let d = parse_date_safe(Some("01/02/24"), "%d/%m/%y").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        let d = parse_date_safe(Some("31/12/99"), "%d/%m/%y").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(1999, 12, 31).unwrap());
        assert!(parse_date_safe(Some("31/02/24"), "%d/%m/%y").is_none());
        assert!(parse_date_safe(Some("2024-02-01"), "%d/%m/%y").is_none());
    }

    #[test]
    fn percent_is_undefined_on_zero_denominator() {
        assert_eq!(percent(100.0, 1000.0), Some(10.0));
        assert_eq!(percent(5.0, 0.0), None);
        assert_eq!(percent(0.0, 0.0), None);
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-12.5, 1), "-12.5");
        assert_eq!(format_number(25202.0, 0), "25,202");
        assert_eq!(format_int(9855usize), "9,855");
    }

    #[test]
    fn undefined_values_display_as_dash() {
        assert_eq!(display_metric(&None), "-");
        assert_eq!(display_metric(&Some(10.0)), "10.00");
        assert_eq!(display_optional::<u32>(&None), "-");
        assert_eq!(display_optional(&Some(1800u32)), "1800");
        assert_eq!(display_optional_sales(&Some(1234.4)), "1,234");
        assert_eq!(display_optional_sales(&None), "-");
    }

    #[test]
    fn undefined_growth_renders_as_dash_cell() {
        use crate::types::GrowthRecord;
        use tabled::Table;

        let rows = vec![
            GrowthRecord { year: 2015, sales: 100.0, growth: None },
            GrowthRecord { year: 2016, sales: 150.0, growth: Some(50.0) },
        ];
        let rendered = Table::new(rows).to_string();
        let cells = |year: &str| -> Vec<String> {
            rendered
                .lines()
                .find(|l| l.contains(year))
                .unwrap()
                .split('|')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect()
        };
        assert_eq!(cells("2015"), vec!["2015", "100", "-"]);
        assert_eq!(cells("2016"), vec!["2016", "150", "50.00"]);
    }
}
