//! Age calculation — whole years since birth.

use chrono::{Datelike, NaiveDate};
use hbd_core::error::Result;
use hbd_core::types::parse_date;

/// Age in whole years on `today`. One less if this year's birthday is
/// still ahead; a birthdate after `today` gives 0.
pub fn age_on(birthdate: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        age -= 1;
    }
    u32::try_from(age).unwrap_or(0)
}

/// Parse a stored `YYYY-MM-DD` birthdate and compute the age on `today`.
pub fn calculate_age(birthdate: &str, today: NaiveDate) -> Result<u32> {
    Ok(age_on(parse_date(birthdate)?, today))
}
