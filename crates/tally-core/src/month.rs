//! Calendar month values (`YYYY-MM`)
//!
//! Budgets are keyed by month and every aggregation works on the inclusive
//! window `[first_day, last_day]`. Dates are day-granular, so windows are
//! independent of the server's timezone.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// A calendar month, e.g. `2025-03`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Create a month, validating the year (1..=9999) and month (1..=12)
    pub fn new(year: i32, month: u32) -> Result<Self, Error> {
        if !(1..=9999).contains(&year) {
            return Err(Error::InvalidData(format!("Year out of range: {}", year)));
        }
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidData(format!("Invalid month: {}", month)));
        }
        Ok(Self { year, month })
    }

    /// The month a date falls in
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current month in UTC
    pub fn current() -> Self {
        Self::of(Utc::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("month is validated on construction")
    }

    /// Last day of the month
    ///
    /// Stays inside the month so `9999-12` never renders a five-digit year.
    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .expect("month is validated on construction")
    }

    /// `[first_day, last_day]` as stored `YYYY-MM-DD` text
    pub(crate) fn date_range(&self) -> (String, String) {
        (
            self.first_day().format("%Y-%m-%d").to_string(),
            self.last_day().format("%Y-%m-%d").to_string(),
        )
    }

    pub fn next(&self) -> Self {
        self.offset(1)
    }

    pub fn prev(&self) -> Self {
        self.offset(-1)
    }

    /// Shift by a number of months (negative goes back in time)
    pub fn offset(&self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidData(format!("Invalid month '{}' (use YYYY-MM)", s));

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse an expense date
///
/// Accepts `YYYY-MM-DD`, or an RFC 3339 timestamp which is normalized to its
/// UTC calendar day.
pub fn parse_expense_date(s: &str) -> Result<NaiveDate, Error> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| Error::InvalidData(format!("Invalid date '{}' (use YYYY-MM-DD)", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let month: Month = "2025-03".parse().unwrap();
        assert_eq!(month.year(), 2025);
        assert_eq!(month.month(), 3);
        assert_eq!(month.to_string(), "2025-03");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["2025-3", "2025-13", "2025-00", "25-03", "2025/03", "2025-03-01", "", "abcd-ef"] {
            assert!(bad.parse::<Month>().is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn test_window_bounds() {
        let month: Month = "2025-02".parse().unwrap();
        assert_eq!(month.first_day(), date(2025, 2, 1));
        assert_eq!(month.last_day(), date(2025, 2, 28));
        assert_eq!(
            month.date_range(),
            ("2025-02-01".to_string(), "2025-02-28".to_string())
        );

        let leap: Month = "2024-02".parse().unwrap();
        assert_eq!(leap.last_day(), date(2024, 2, 29));
    }

    #[test]
    fn test_last_supported_month_stays_four_digit() {
        let month: Month = "9999-12".parse().unwrap();
        assert_eq!(month.last_day(), date(9999, 12, 31));
        assert_eq!(
            month.date_range(),
            ("9999-12-01".to_string(), "9999-12-31".to_string())
        );
        assert!("10000-01".parse::<Month>().is_err());
    }

    #[test]
    fn test_navigation_across_years() {
        let jan: Month = "2025-01".parse().unwrap();
        assert_eq!(jan.prev().to_string(), "2024-12");
        assert_eq!(jan.offset(-3).to_string(), "2024-10");

        let dec: Month = "2024-12".parse().unwrap();
        assert_eq!(dec.next().to_string(), "2025-01");
        assert_eq!(dec.last_day(), date(2024, 12, 31));
    }

    #[test]
    fn test_month_of_date() {
        assert_eq!(Month::of(date(2025, 3, 10)).to_string(), "2025-03");
    }

    #[test]
    fn test_serde_as_string() {
        let month: Month = "2025-11".parse().unwrap();
        assert_eq!(serde_json::to_string(&month).unwrap(), "\"2025-11\"");

        let parsed: Month = serde_json::from_str("\"2025-11\"").unwrap();
        assert_eq!(parsed, month);
        assert!(serde_json::from_str::<Month>("\"2025-1\"").is_err());
    }

    #[test]
    fn test_parse_expense_date() {
        assert_eq!(parse_expense_date("2025-03-10").unwrap(), date(2025, 3, 10));
        assert_eq!(
            parse_expense_date("2025-03-31T23:30:00-02:00").unwrap(),
            date(2025, 4, 1)
        );
        assert_eq!(
            parse_expense_date("2025-11-15T00:00:00.000Z").unwrap(),
            date(2025, 11, 15)
        );
        assert!(parse_expense_date("10/03/2025").is_err());
        assert!(parse_expense_date("2025-02-30").is_err());
    }
}
