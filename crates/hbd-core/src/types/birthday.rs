//! Birthday records — the core data model.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{HbdError, Result};

/// Storage format of every birthdate.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` string into a calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| HbdError::invalid_date(input))
}

/// A stored person/date/age triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthdayRecord {
    /// Assigned by the store on insert.
    pub id: i64,
    pub name: String,
    /// Birthdate as stored (`YYYY-MM-DD`). Authoritative.
    pub date: String,
    /// Cached age as of the last scan or edit.
    pub age: u32,
}

impl BirthdayRecord {
    /// Parsed birthdate. Fails if the stored string is malformed.
    pub fn birthdate(&self) -> Result<NaiveDate> {
        parse_date(&self.date)
    }
}

/// Validated input for add/edit.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBirthday {
    pub name: String,
    /// Canonical `YYYY-MM-DD`.
    pub date: String,
}

impl NewBirthday {
    /// Trim and validate a name and a date string.
    pub fn parse(name: &str, date: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HbdError::Validation("name must not be empty".into()));
        }
        let parsed = parse_date(date)?;
        Ok(Self {
            name: name.to_string(),
            date: parsed.format(DATE_FORMAT).to_string(),
        })
    }

    pub fn birthdate(&self) -> Result<NaiveDate> {
        parse_date(&self.date)
    }
}

/// Calendar month and day, year ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }
}

/// `MM-DD`, the same shape SQLite's `strftime('%m-%d', ...)` produces.
impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let d = parse_date("1990-03-15").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (1990, 3, 15));
        assert!(parse_date(" 1990-03-15 ").is_ok());
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        for bad in ["", "15/03/1990", "1990-02-30", "1990-13-01", "yesterday"] {
            let err = parse_date(bad).unwrap_err();
            assert!(matches!(err, HbdError::InvalidDateFormat(_)), "{bad}");
        }
    }

    #[test]
    fn test_new_birthday_trims_and_normalises() {
        let nb = NewBirthday::parse("  Ada  ", "1990-3-5").unwrap();
        assert_eq!(nb.name, "Ada");
        assert_eq!(nb.date, "1990-03-05");
    }

    #[test]
    fn test_new_birthday_empty_name() {
        let err = NewBirthday::parse("   ", "1990-03-15").unwrap_err();
        assert!(matches!(err, HbdError::Validation(_)));
    }

    #[test]
    fn test_new_birthday_bad_date() {
        let err = NewBirthday::parse("Ada", "not a date").unwrap_err();
        assert!(matches!(err, HbdError::InvalidDateFormat(_)));
    }

    #[test]
    fn test_month_day_display() {
        let md = MonthDay::of(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(md.to_string(), "03-05");
    }

    #[test]
    fn test_record_birthdate() {
        let rec = BirthdayRecord {
            id: 1,
            name: "Ada".into(),
            date: "bogus".into(),
            age: 0,
        };
        assert!(rec.birthdate().is_err());
    }
}
