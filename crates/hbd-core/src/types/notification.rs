//! Notification log entries and outbound mail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the append-only notification log.
///
/// `birthday_id` is a weak reference: deleting the birthday leaves the
/// entry in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationLogEntry {
    pub id: i64,
    pub birthday_id: i64,
    pub message: String,
    /// When the dispatch was attempted.
    pub timestamp: DateTime<Utc>,
}

/// A fully addressed plain-text email, ready for a transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}
