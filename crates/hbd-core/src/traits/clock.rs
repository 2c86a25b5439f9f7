//! Time source.

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Where "today" and "now" come from.
pub trait Clock: Send + Sync {
    /// Calendar date used for month-day matching and age calculation.
    fn today(&self) -> NaiveDate;

    /// Instant stamped on notifications.
    fn now(&self) -> DateTime<Utc>;
}

/// System clock. "Today" is the local calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
