//! Date differences and ages

use chrono::{Local, NaiveDate, NaiveDateTime};

use super::CalcResult;

const DAYS_PER_YEAR: f64 = 365.25;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d %B, %Y",
];

/// Parse a date written in any of the common layouts. A bare year means
/// January 1st; a month and year means the first of that month.
pub fn parse_date(input: &str) -> CalcResult<NaiveDateTime> {
    let s = input.trim();
    if s.is_empty() {
        return Err("String does not contain a date: ''".to_string());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }

    let cleaned = strip_ordinals(s);
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return Ok(midnight(date));
        }
    }

    if let Ok(year) = cleaned.parse::<i32>() {
        if let Some(date) = NaiveDate::from_ymd_opt(year, 1, 1) {
            return Ok(midnight(date));
        }
    }

    for fmt in ["%d %B %Y", "%d %b %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("1 {}", cleaned), fmt) {
            return Ok(midnight(date));
        }
    }

    Err(format!("Unknown string format: {}", input))
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap_or_default()
}

/// "July 4th, 1776" -> "July 4, 1776"
fn strip_ordinals(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let digits_end = word.find(|c: char| !c.is_ascii_digit()).unwrap_or(word.len());
            let (digits, rest) = word.split_at(digits_end);
            let suffix = rest.trim_end_matches(',').to_lowercase();
            if !digits.is_empty() && matches!(suffix.as_str(), "st" | "nd" | "rd" | "th") {
                format!("{}{}", digits, if rest.ends_with(',') { "," } else { "" })
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whole days from `start` to `end`; negative when `end` comes first
pub fn days_between(start: &str, end: &str) -> CalcResult<i64> {
    let start = parse_date(start).map_err(|e| format!("Date parsing error: {}", e))?;
    let end = parse_date(end).map_err(|e| format!("Date parsing error: {}", e))?;
    Ok((end - start).num_days())
}

/// Years between two dates, as days / 365.25 rounded to the nearest whole year
pub fn years_between(start: &str, end: &str) -> CalcResult<i64> {
    let days = days_between(start, end)?;
    Ok(whole_years(days))
}

/// Age today of someone born on `birth`
pub fn calculate_age(birth: &str) -> CalcResult<i64> {
    age_on(birth, Local::now().naive_local())
}

/// Age on a given day
pub fn age_on(birth: &str, today: NaiveDateTime) -> CalcResult<i64> {
    let birth = parse_date(birth).map_err(|e| format!("Age calculation error: {}", e))?;
    Ok(whole_years((today - birth).num_days()))
}

fn whole_years(days: i64) -> i64 {
    (days as f64 / DAYS_PER_YEAR).round_ties_even() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_common_formats() {
        let expected = NaiveDate::from_ymd_opt(1776, 7, 4).unwrap();
        for input in [
            "1776-07-04",
            "07/04/1776",
            "July 4, 1776",
            "July 4th, 1776",
            "4 July 1776",
            "Jul 4 1776",
        ] {
            assert_eq!(parse_date(input).unwrap().date(), expected, "{}", input);
        }
    }

    #[test]
    fn test_partial_dates() {
        assert_eq!(
            parse_date("1969").unwrap().date(),
            NaiveDate::from_ymd_opt(1969, 1, 1).unwrap()
        );
        assert_eq!(
            parse_date("March 2001").unwrap().date(),
            NaiveDate::from_ymd_opt(2001, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_days_and_years_between() {
        assert_eq!(days_between("2020-01-01", "2021-01-01"), Ok(366));
        assert_eq!(days_between("2021-01-01", "2020-01-01"), Ok(-366));
        assert_eq!(years_between("1776-07-04", "2026-07-04"), Ok(250));
    }

    #[test]
    fn test_date_errors() {
        let err = days_between("not a date", "2020-01-01").unwrap_err();
        assert!(err.starts_with("Date parsing error:"));
    }

    #[test]
    fn test_age_on() {
        let today = parse_date("2026-10-18").unwrap();
        assert_eq!(age_on("2000-01-01", today), Ok(27));
        assert!(age_on("yesterday-ish", today)
            .unwrap_err()
            .starts_with("Age calculation error:"));
    }
}
