//! Calendar-day arithmetic shared by the matcher and the cash-flow aggregator

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::*;

const ISO_FORMAT: &str = "%Y-%m-%d";

/// Format a date as `YYYY-MM-DD`
pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_iso_date(value: &str) -> FinanceResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ISO_FORMAT)
        .map_err(|e| FinanceError::InvalidDate(format!("'{}': {}", value, e)))
}

/// Signed number of days from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

pub fn abs_days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    days_between(a, b).abs()
}

/// Number of calendar days in `[start, end]`, zero when the range is inverted
pub fn day_count_inclusive(start: NaiveDate, end: NaiveDate) -> usize {
    if start > end {
        0
    } else {
        (days_between(start, end) + 1) as usize
    }
}

/// Iterate every calendar day in `[start, end]` in ascending order
pub fn iter_days(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start
        .iter_days()
        .take(day_count_inclusive(start, end))
}

/// First and last day of the month containing `date`
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_month_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next_month_first
        .and_then(|d| d.pred_opt())
        .unwrap_or(first);
    (first, last)
}

/// Named reporting periods relative to a reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Today,
    /// The reference day and the six days before it
    Last7Days,
    /// The reference day and the 29 days before it
    Last30Days,
    CurrentMonth,
    PreviousMonth,
    CurrentYear,
}

impl Period {
    /// Inclusive `(start, end)` boundaries of the period around `reference`
    pub fn bounds(&self, reference: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Period::Today => (reference, reference),
            Period::Last7Days => (reference - Duration::days(6), reference),
            Period::Last30Days => (reference - Duration::days(29), reference),
            Period::CurrentMonth => month_bounds(reference),
            Period::PreviousMonth => {
                let (first, _) = month_bounds(reference);
                let last_of_previous = first.pred_opt().unwrap_or(first);
                month_bounds(last_of_previous)
            }
            Period::CurrentYear => {
                let start = NaiveDate::from_ymd_opt(reference.year(), 1, 1).unwrap_or(reference);
                let end = NaiveDate::from_ymd_opt(reference.year(), 12, 31).unwrap_or(reference);
                (start, end)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_round_trip() {
        let parsed = parse_iso_date("2025-01-10").unwrap();
        assert_eq!(parsed, date(2025, 1, 10));
        assert_eq!(format_iso(parsed), "2025-01-10");
    }

    #[test]
    fn test_parse_rejects_malformed_dates() {
        assert!(matches!(
            parse_iso_date("10/01/2025"),
            Err(FinanceError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_iso_date("2025-02-30"),
            Err(FinanceError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_days_between_is_signed() {
        assert_eq!(days_between(date(2025, 1, 10), date(2025, 1, 13)), 3);
        assert_eq!(days_between(date(2025, 1, 13), date(2025, 1, 10)), -3);
        assert_eq!(abs_days_between(date(2025, 1, 13), date(2025, 1, 10)), 3);
    }

    #[test]
    fn test_iter_days_crosses_month_and_leap_day() {
        let days: Vec<_> = iter_days(date(2024, 2, 27), date(2024, 3, 2)).collect();
        assert_eq!(
            days,
            vec![
                date(2024, 2, 27),
                date(2024, 2, 28),
                date(2024, 2, 29),
                date(2024, 3, 1),
                date(2024, 3, 2),
            ]
        );
    }

    #[test]
    fn test_iter_days_single_and_inverted() {
        assert_eq!(iter_days(date(2025, 5, 1), date(2025, 5, 1)).count(), 1);
        assert_eq!(iter_days(date(2025, 5, 2), date(2025, 5, 1)).count(), 0);
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            month_bounds(date(2024, 2, 15)),
            (date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(
            month_bounds(date(2025, 12, 31)),
            (date(2025, 12, 1), date(2025, 12, 31))
        );
    }

    #[test]
    fn test_period_bounds() {
        let reference = date(2025, 3, 10);
        assert_eq!(
            Period::Last7Days.bounds(reference),
            (date(2025, 3, 4), reference)
        );
        assert_eq!(
            Period::PreviousMonth.bounds(reference),
            (date(2025, 2, 1), date(2025, 2, 28))
        );
        assert_eq!(
            Period::PreviousMonth.bounds(date(2025, 1, 5)),
            (date(2024, 12, 1), date(2024, 12, 31))
        );
        assert_eq!(
            Period::CurrentYear.bounds(reference),
            (date(2025, 1, 1), date(2025, 12, 31))
        );
    }
}
