//! Calendar-month arithmetic: the unit the forecast timeline is keyed by.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow, bail};
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A calendar month. Always holds a month in `1..=12`.
///
/// Ordering is chronological: by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Returns `None` when `month` is outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Shift by a signed number of months, rolling over year boundaries in
    /// both directions.
    pub fn offset(&self, months: i32) -> Self {
        let index = self.index() + i64::from(months);
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// The next calendar month.
    pub fn succ(&self) -> Self {
        self.offset(1)
    }

    /// Number of months from `self` to `later` (negative if `later` is earlier).
    pub fn months_until(&self, later: YearMonth) -> i32 {
        (later.year - self.year) * 12 + (later.month as i32 - self.month as i32)
    }

    /// True if `year`/`month` (possibly out of range) denote this month.
    pub fn matches(&self, year: i32, month: u32) -> bool {
        self.year == year && self.month == month
    }

    /// First day of the month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    fn index(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Parse a month written as `2026-3`, `2026-03`, `2026/03` or `2026年3月`.
pub fn parse_year_month(s: &str) -> Result<YearMonth> {
    let re = Regex::new(r"^\s*(?P<year>\d{4})\s*[-/年]\s*(?P<month>\d{1,2})\s*月?\s*$")?;

    let caps = re
        .captures(s)
        .ok_or_else(|| anyhow!("invalid month '{s}' (expected YYYY-MM)"))?;

    let year: i32 = caps["year"].parse()?;
    let month: u32 = caps["month"].parse()?;

    match YearMonth::new(year, month) {
        Some(ym) => Ok(ym),
        None => bail!("month out of range in '{s}': {month}"),
    }
}

impl FromStr for YearMonth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_year_month(s)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        parse_year_month(&s)
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_rejects_out_of_range_month() {
        assert!(YearMonth::new(2026, 0).is_none());
        assert!(YearMonth::new(2026, 13).is_none());
    }

    #[test]
    fn test_offset_rolls_over_forward() {
        assert_eq!(ym(2026, 11).offset(2), ym(2027, 1));
        assert_eq!(ym(2026, 1).offset(59), ym(2030, 12));
    }

    #[test]
    fn test_offset_rolls_over_backward() {
        assert_eq!(ym(2026, 1).offset(-1), ym(2025, 12));
        assert_eq!(ym(2026, 3).offset(-12), ym(2025, 3));
        assert_eq!(ym(2026, 3).offset(-15), ym(2024, 12));
    }

    #[test]
    fn test_months_until() {
        assert_eq!(ym(2025, 10).months_until(ym(2026, 2)), 4);
        assert_eq!(ym(2026, 2).months_until(ym(2025, 10)), -4);
        assert_eq!(ym(2026, 2).months_until(ym(2026, 2)), 0);
    }

    #[test]
    fn test_ordering_is_chronological() {
        assert!(ym(2025, 12) < ym(2026, 1));
        assert!(ym(2026, 2) > ym(2026, 1));
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(parse_year_month("2026-3").unwrap(), ym(2026, 3));
        assert_eq!(parse_year_month("2026-03").unwrap(), ym(2026, 3));
        assert_eq!(parse_year_month("2026/12").unwrap(), ym(2026, 12));
        assert_eq!(parse_year_month("2026年4月").unwrap(), ym(2026, 4));
        assert!(parse_year_month("2026-13").is_err());
        assert!(parse_year_month("March 2026").is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&ym(2026, 7)).unwrap();
        assert_eq!(json, "\"2026-07\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym(2026, 7));
    }
}
