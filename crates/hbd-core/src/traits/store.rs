//! Record store trait — owns birthdays and the notification log.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{BirthdayRecord, MonthDay, NewBirthday, NotificationLogEntry};

/// Persistence boundary for birthday records and the notification log.
///
/// Ordering is part of the contract: `list_all` is newest id first,
/// `list_matching_month_day` is ascending by id.
pub trait RecordStore: Send + Sync {
    /// All records, descending by id.
    fn list_all(&self) -> Result<Vec<BirthdayRecord>>;

    /// Records whose stored date has this month and day, any year.
    /// Ascending by id.
    fn list_matching_month_day(&self, month_day: MonthDay) -> Result<Vec<BirthdayRecord>>;

    fn get(&self, id: i64) -> Result<Option<BirthdayRecord>>;

    /// Insert a record and return its assigned id.
    fn add(&self, birthday: &NewBirthday, age: u32) -> Result<i64>;

    /// Replace name, date and age. `NotFound` if the id is unknown.
    fn update(&self, id: i64, birthday: &NewBirthday, age: u32) -> Result<()>;

    /// `NotFound` if the id is unknown.
    fn delete(&self, id: i64) -> Result<()>;

    /// Overwrite the cached age only.
    fn update_age(&self, id: i64, age: u32) -> Result<()>;

    /// Append a log entry and return its id. Fails with `LogWrite`.
    fn append_notification_log(
        &self,
        birthday_id: i64,
        message: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<i64>;

    /// Most recent log entries first.
    fn list_notifications(&self, limit: usize) -> Result<Vec<NotificationLogEntry>>;
}
