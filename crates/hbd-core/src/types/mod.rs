//! Domain types shared across the workspace.

pub mod birthday;
pub mod notification;

pub use birthday::{BirthdayRecord, MonthDay, NewBirthday, parse_date};
pub use notification::{NotificationLogEntry, OutgoingMail};
