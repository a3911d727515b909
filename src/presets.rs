// 📅 Date-Range Presets - quick filter bounds
// Weeks start on Monday; every bound is canonical YYYY-MM-DD text

use crate::validation::DATE_FORMAT;
use chrono::{Datelike, Duration, Local, NaiveDate};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: String,
    pub to: String,
}

impl DateRange {
    fn between(from: NaiveDate, to: NaiveDate) -> Self {
        DateRange {
            from: format_date(from),
            to: format_date(to),
        }
    }

    pub fn today(reference: NaiveDate) -> Self {
        Self::between(reference, reference)
    }

    pub fn this_week(reference: NaiveDate) -> Self {
        Self::between(start_of_week(reference), reference)
    }

    pub fn this_month(reference: NaiveDate) -> Self {
        let first = reference - Duration::days(i64::from(reference.day0()));
        Self::between(first, reference)
    }

    /// Both bounds empty
    pub fn cleared() -> Self {
        Self::default()
    }
}

/// Monday of the week containing `day`
pub fn start_of_week(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

pub fn format_date(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

/// Today on the local clock
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickRange {
    Today,
    ThisWeek,
    ThisMonth,
    Clear,
}

impl QuickRange {
    pub fn resolve(&self, reference: NaiveDate) -> DateRange {
        match self {
            QuickRange::Today => DateRange::today(reference),
            QuickRange::ThisWeek => DateRange::this_week(reference),
            QuickRange::ThisMonth => DateRange::this_month(reference),
            QuickRange::Clear => DateRange::cleared(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            QuickRange::Today => "Today",
            QuickRange::ThisWeek => "This Week",
            QuickRange::ThisMonth => "This Month",
            QuickRange::Clear => "Clear",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_today() {
        let range = DateRange::today(day("2024-05-08"));
        assert_eq!(range.from, "2024-05-08");
        assert_eq!(range.to, "2024-05-08");
    }

    #[test]
    fn test_this_week_from_wednesday() {
        // 2024-05-08 is a Wednesday
        let range = QuickRange::ThisWeek.resolve(day("2024-05-08"));
        assert_eq!(range.from, "2024-05-06");
        assert_eq!(range.to, "2024-05-08");
    }

    #[test]
    fn test_this_week_from_monday_and_sunday() {
        let monday = DateRange::this_week(day("2024-05-06"));
        assert_eq!(monday.from, "2024-05-06");

        // Sunday belongs to the week that started six days earlier
        let sunday = DateRange::this_week(day("2024-05-12"));
        assert_eq!(sunday.from, "2024-05-06");
        assert_eq!(sunday.to, "2024-05-12");
    }

    #[test]
    fn test_this_week_crosses_month_and_year() {
        // 2025-01-01 is a Wednesday
        let range = DateRange::this_week(day("2025-01-01"));
        assert_eq!(range.from, "2024-12-30");
    }

    #[test]
    fn test_this_month() {
        let range = QuickRange::ThisMonth.resolve(day("2024-02-29"));
        assert_eq!(range.from, "2024-02-01");
        assert_eq!(range.to, "2024-02-29");

        let first = DateRange::this_month(day("2024-03-01"));
        assert_eq!(first.from, "2024-03-01");
    }

    #[test]
    fn test_clear() {
        let range = QuickRange::Clear.resolve(day("2024-05-08"));
        assert!(range.from.is_empty());
        assert!(range.to.is_empty());
    }
}
