//! Birthday notifications — compose the reminder and hand it to a transport.
//! No queue, no retry. One call, one email.

use chrono::{DateTime, Utc};
use hbd_core::error::Result;
use hbd_core::traits::MailTransport;
use hbd_core::types::{BirthdayRecord, OutgoingMail};
use serde::Serialize;
use std::sync::Arc;

/// A reminder for one birthday match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub birthday_id: i64,
    /// Subject line.
    pub title: String,
    /// Body; this is also what goes into the notification log.
    pub body: String,
    pub recipient: String,
    /// When the dispatch was attempted.
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    pub fn to_mail(&self) -> OutgoingMail {
        OutgoingMail {
            to: self.recipient.clone(),
            subject: self.title.clone(),
            body: self.body.clone(),
        }
    }
}

pub fn reminder_body(name: &str, age: u32) -> String {
    format!("Today is {name}'s birthday! They turn {age}.")
}

pub fn reminder_subject(name: &str, date: &str) -> String {
    format!("Birthday Reminder: {name} on {date}")
}

/// Sends reminders to one fixed recipient.
pub struct Notifier {
    recipient: String,
    transport: Arc<dyn MailTransport>,
}

impl Notifier {
    pub fn new(recipient: impl Into<String>, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            recipient: recipient.into(),
            transport,
        }
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Build the reminder for `record` turning `age`.
    pub fn compose(
        &self,
        record: &BirthdayRecord,
        age: u32,
        timestamp: DateTime<Utc>,
    ) -> Notification {
        Notification {
            birthday_id: record.id,
            title: reminder_subject(&record.name, &record.date),
            body: reminder_body(&record.name, age),
            recipient: self.recipient.clone(),
            timestamp,
        }
    }

    /// Dispatch through the transport. Errors are `HbdError::Delivery`.
    pub async fn send(&self, notification: &Notification) -> Result<()> {
        tracing::debug!(
            "📨 Sending '{}' via {} to {}",
            notification.title,
            self.transport.name(),
            notification.recipient
        );
        self.transport.send(&notification.to_mail()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use hbd_core::error::HbdError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<OutgoingMail>>,
        fail: bool,
    }

    #[async_trait]
    impl MailTransport for Outbox {
        fn name(&self) -> &str {
            "outbox"
        }

        async fn send(&self, mail: &OutgoingMail) -> Result<()> {
            if self.fail {
                return Err(HbdError::delivery("connection refused"));
            }
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    fn ada() -> BirthdayRecord {
        BirthdayRecord {
            id: 1,
            name: "Ada".into(),
            date: "1990-03-15".into(),
            age: 33,
        }
    }

    #[test]
    fn test_compose() {
        let notifier = Notifier::new("me@example.com", Arc::new(Outbox::default()));
        let ts = Utc.with_ymd_and_hms(2024, 3, 15, 7, 0, 0).unwrap();
        let n = notifier.compose(&ada(), 34, ts);
        assert_eq!(n.birthday_id, 1);
        assert_eq!(n.body, "Today is Ada's birthday! They turn 34.");
        assert_eq!(n.title, "Birthday Reminder: Ada on 1990-03-15");
        assert_eq!(n.recipient, "me@example.com");
        assert_eq!(n.timestamp, ts);
    }

    #[tokio::test]
    async fn test_send_goes_to_fixed_recipient() {
        let outbox = Arc::new(Outbox::default());
        let notifier = Notifier::new("me@example.com", outbox.clone());
        let n = notifier.compose(&ada(), 34, Utc::now());
        notifier.send(&n).await.unwrap();

        let sent = outbox.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "me@example.com");
        assert_eq!(sent[0].body, n.body);
    }

    #[tokio::test]
    async fn test_send_failure_is_reported() {
        let outbox = Arc::new(Outbox {
            fail: true,
            ..Outbox::default()
        });
        let notifier = Notifier::new("me@example.com", outbox);
        let n = notifier.compose(&ada(), 34, Utc::now());
        let err = notifier.send(&n).await.unwrap_err();
        assert!(matches!(err, HbdError::Delivery(_)));
    }
}
