//! # hbd Core
//! Domain types, seam traits, configuration and the shared error type.
//!
//! Everything else in the workspace depends on this crate; it has no
//! knowledge of SQLite, SMTP or tokio.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::HbdConfig;
pub use error::{HbdError, Result};
pub use traits::{Clock, MailTransport, RecordStore, SystemClock};
pub use types::{BirthdayRecord, MonthDay, NewBirthday, NotificationLogEntry, OutgoingMail};
