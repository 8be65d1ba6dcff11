// Parsing and formatting helpers.
//
// All the loose string handling (dates in several layouts, numbers typed by
// hand) lives here so the validator only has to deal with `Option`s.
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use num_format::{Locale, ToFormattedString};
use tracing::debug;

/// Explicit layouts tried after the ISO-8601 attempt, in priority order.
///
/// `MM/dd/yyyy` sits before `dd/MM/yyyy`, so an ambiguous value such as
/// `03/04/2024` always reads as March 4th.
pub const DATE_FORMATS: &[(&str, &str)] = &[
    ("yyyy-MM-dd", "%Y-%m-%d"),
    ("MM/dd/yyyy", "%m/%d/%Y"),
    ("dd/MM/yyyy", "%d/%m/%Y"),
    ("yyyy/MM/dd", "%Y/%m/%d"),
    ("M/d/yyyy", "%-m/%-d/%Y"),
    ("d/M/yyyy", "%-d/%-m/%Y"),
];

const ISO_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.and_time(NaiveTime::MIN));
    }
    for fmt in ISO_DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    // Offsets are kept as the wall-clock time they were written in.
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local())
}

/// Parse a date typed in any of the supported layouts.
///
/// Returns the first successful interpretation, or `None` when every layout
/// rejects the value (including calendar-invalid dates like `02/30/2024`).
pub fn parse_date_flexible(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(dt) = parse_iso(s) {
        return Some(dt);
    }
    DATE_FORMATS.iter().find_map(|(label, fmt)| {
        let d = NaiveDate::parse_from_str(s, fmt).ok()?;
        debug!(value = s, layout = *label, "date matched explicit layout");
        Some(d.and_time(NaiveTime::MIN))
    })
}

/// Parse a distance cell. Anything that is not a finite number is `None`;
/// range checks are left to the caller.
pub fn parse_distance(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    // `f64::from_str` accepts "inf" and "NaN", so finiteness is checked separately.
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Sortable calendar key, e.g. `2024-01-05`.
pub fn date_key(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// Chart label, e.g. `Jan 05, 2024`.
pub fn display_date(dt: &NaiveDateTime) -> String {
    dt.format("%b %d, %Y").to_string()
}

pub fn average(v: &[f64]) -> f64 {
    // Arithmetic mean; 0 for an empty slice to avoid NaN.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus thousands separators (e.g. `1,234.50`).
    let neg = n.is_sign_negative() && n != 0.0;
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

pub fn format_miles(n: f64) -> String {
    format!("{} mi", format_number(n, 2))
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn ymd(dt: NaiveDateTime) -> (i32, u32, u32) {
        (dt.year(), dt.month(), dt.day())
    }

    #[test]
    fn parses_iso_calendar_date_at_midnight() {
        let dt = parse_date_flexible("2024-01-05").unwrap();
        assert_eq!(ymd(dt), (2024, 1, 5));
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn parses_iso_date_time() {
        let dt = parse_date_flexible("2024-01-05T07:30:00").unwrap();
        assert_eq!(ymd(dt), (2024, 1, 5));
        assert_eq!((dt.hour(), dt.minute()), (7, 30));

        let dt = parse_date_flexible("2024-01-05T07:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 7);
    }

    #[test]
    fn parses_slash_layouts() {
        assert_eq!(ymd(parse_date_flexible("01/05/2024").unwrap()), (2024, 1, 5));
        assert_eq!(ymd(parse_date_flexible("2024/01/05").unwrap()), (2024, 1, 5));
        assert_eq!(ymd(parse_date_flexible("1/5/2024").unwrap()), (2024, 1, 5));
    }

    #[test]
    fn explicit_layouts_keep_priority_order() {
        let labels: Vec<&str> = DATE_FORMATS.iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            vec!["yyyy-MM-dd", "MM/dd/yyyy", "dd/MM/yyyy", "yyyy/MM/dd", "M/d/yyyy", "d/M/yyyy"]
        );
    }

    #[test]
    fn ambiguous_date_prefers_month_first() {
        assert_eq!(ymd(parse_date_flexible("03/04/2024").unwrap()), (2024, 3, 4));
    }

    #[test]
    fn falls_back_to_day_first_when_month_is_out_of_range() {
        assert_eq!(ymd(parse_date_flexible("25/12/2023").unwrap()), (2023, 12, 25));
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(parse_date_flexible("13/40/2024").is_none());
        assert!(parse_date_flexible("02/30/2024").is_none());
        assert!(parse_date_flexible("yesterday").is_none());
        assert!(parse_date_flexible("   ").is_none());
    }

    #[test]
    fn distance_parsing_rejects_non_finite() {
        assert_eq!(parse_distance(" 5.25 "), Some(5.25));
        assert_eq!(parse_distance("-0.1"), Some(-0.1));
        assert_eq!(parse_distance("abc"), None);
        assert_eq!(parse_distance("NaN"), None);
        assert_eq!(parse_distance("inf"), None);
        assert_eq!(parse_distance(""), None);
    }

    #[test]
    fn formats_labels() {
        let dt = parse_date_flexible("2024-01-05").unwrap();
        assert_eq!(date_key(&dt), "2024-01-05");
        assert_eq!(display_date(&dt), "Jan 05, 2024");
        assert_eq!(format_miles(1234.5), "1,234.50 mi");
        assert_eq!(format_number(-2.0, 1), "-2.0");
        assert_eq!(format_int(9855), "9,855");
    }
}
