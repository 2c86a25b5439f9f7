//! Email channel — async SMTP sending via lettre.
//!
//! Port 465 uses implicit TLS, anything else uses STARTTLS (Gmail, Outlook,
//! most custom relays on 587). No retry: a failed send is returned to the
//! caller as `HbdError::Delivery`.

use async_trait::async_trait;
use hbd_core::config::MailConfig;
use hbd_core::error::{HbdError, Result};
use hbd_core::traits::MailTransport;
use hbd_core::types::OutgoingMail;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

const IMPLICIT_TLS_PORT: u16 = 465;

/// SMTP mailer. Built once from config; the sender is the SMTP username.
pub struct SmtpMailer {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the transport. Must be called inside a tokio runtime.
    pub fn new(config: &MailConfig) -> Result<Self> {
        config.require_complete()?;
        let from = sender_mailbox(config)?;

        let builder = if config.smtp_port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        }
        .map_err(|e| HbdError::config(format!("SMTP relay {}: {e}", config.smtp_host)))?;

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        tracing::debug!(
            "📧 SMTP mailer ready: {}:{} as {}",
            config.smtp_host,
            config.smtp_port,
            config.username
        );
        Ok(Self { from, transport })
    }
}

fn sender_mailbox(config: &MailConfig) -> Result<Mailbox> {
    format!("{} <{}>", config.sender_name, config.username)
        .parse()
        .map_err(|e| HbdError::config(format!("Invalid sender '{}': {e}", config.username)))
}

/// Build a plain-text message from `from` to `mail.to`.
fn build_message(from: &Mailbox, mail: &OutgoingMail) -> Result<Message> {
    let to: Mailbox = mail
        .to
        .parse()
        .map_err(|e| HbdError::delivery(format!("Invalid recipient '{}': {e}", mail.to)))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(mail.body.clone())
        .map_err(|e| HbdError::delivery(format!("Build email: {e}")))
}

#[async_trait]
impl MailTransport for SmtpMailer {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let message = build_message(&self.from, mail)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| HbdError::delivery(format!("SMTP send: {e}")))?;
        tracing::info!("📤 Email sent to: {}", mail.to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MailConfig {
        MailConfig {
            username: "bot@example.com".into(),
            password: "secret".into(),
            recipient: "me@example.com".into(),
            ..MailConfig::default()
        }
    }

    fn mail(to: &str) -> OutgoingMail {
        OutgoingMail {
            to: to.into(),
            subject: "Birthday Reminder: Ada on 1990-03-15".into(),
            body: "Today is Ada's birthday! They turn 34.".into(),
        }
    }

    #[test]
    fn test_build_message_headers_and_body() {
        let from = sender_mailbox(&config()).unwrap();
        let msg = build_message(&from, &mail("me@example.com")).unwrap();
        let raw = String::from_utf8(msg.formatted()).unwrap();
        assert!(raw.contains("From: Birthday <bot@example.com>"));
        assert!(raw.contains("To: me@example.com"));
        assert!(raw.contains("Subject: Birthday Reminder: Ada on 1990-03-15"));
        assert!(raw.contains("Today is Ada's birthday! They turn 34."));
    }

    #[test]
    fn test_bad_recipient_is_delivery_error() {
        let from = sender_mailbox(&config()).unwrap();
        let err = build_message(&from, &mail("not an address")).unwrap_err();
        assert!(matches!(err, HbdError::Delivery(_)));
    }

    #[test]
    fn test_bad_sender_is_config_error() {
        let mut cfg = config();
        cfg.username = "no-at-sign".into();
        assert!(matches!(sender_mailbox(&cfg), Err(HbdError::Config(_))));
    }

    #[tokio::test]
    async fn test_new_requires_recipient() {
        let mut cfg = config();
        cfg.recipient.clear();
        assert!(matches!(SmtpMailer::new(&cfg), Err(HbdError::Config(_))));
    }

    #[tokio::test]
    async fn test_new_builds_without_connecting() {
        let mailer = SmtpMailer::new(&config()).unwrap();
        assert_eq!(mailer.name(), "smtp");

        let mut implicit = config();
        implicit.smtp_port = 465;
        assert!(SmtpMailer::new(&implicit).is_ok());
    }
}
