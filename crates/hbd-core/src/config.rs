//! hbd configuration system.
//!
//! Loaded once at startup from `~/.hbd/config.toml` (or an explicit path),
//! then overlaid with the deployment environment variables. The resulting
//! struct is passed explicitly to whatever needs it; nothing reads ambient
//! process state later on.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HbdError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HbdConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

fn default_database_path() -> String { "~/.hbd/birthdays.db".into() }

impl Default for HbdConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            mail: MailConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl HbdConfig {
    /// Load config from the default path (~/.hbd/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HbdError::config(format!("Failed to read {}: {e}", path.display())))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| HbdError::config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Overlay the process environment (`DATABASE_PATH`, `MAIL_USERNAME`, ...).
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary lookup. Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("DATABASE_PATH") {
            self.database_path = v;
        }
        if let Some(v) = get("MAIL_SERVER") {
            self.mail.smtp_host = v;
        }
        if let Some(v) = get("MAIL_PORT") {
            match v.parse() {
                Ok(port) => self.mail.smtp_port = port,
                Err(_) => tracing::warn!("⚠️ Ignoring non-numeric MAIL_PORT={v}"),
            }
        }
        if let Some(v) = get("MAIL_USERNAME") {
            self.mail.username = v;
        }
        if let Some(v) = get("MAIL_PASSWORD") {
            self.mail.password = v;
        }
        if let Some(v) = get("MY_EMAIL") {
            self.mail.recipient = v;
        }
        self
    }

    /// Reject values that would make the scheduler misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.schedule.hour > 23 {
            return Err(HbdError::config(format!(
                "schedule.hour must be 0-23, got {}",
                self.schedule.hour
            )));
        }
        if self.schedule.minute > 59 {
            return Err(HbdError::config(format!(
                "schedule.minute must be 0-59, got {}",
                self.schedule.minute
            )));
        }
        if self.database_path.trim().is_empty() {
            return Err(HbdError::config("database_path is empty"));
        }
        Ok(())
    }

    /// Database path with `~` expanded.
    pub fn database_file(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.database_path).to_string())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the hbd home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hbd")
    }
}

/// Outbound mail settings. The sender address is the SMTP username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    /// The single address every reminder goes to.
    #[serde(default)]
    pub recipient: String,
}

fn default_smtp_host() -> String { "smtp.gmail.com".into() }
fn default_smtp_port() -> u16 { 587 }
fn default_sender_name() -> String { "Birthday".into() }

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            sender_name: default_sender_name(),
            recipient: String::new(),
        }
    }
}

impl MailConfig {
    /// Check the fields a mailer cannot work without.
    pub fn require_complete(&self) -> Result<()> {
        if self.recipient.trim().is_empty() {
            return Err(HbdError::config("mail.recipient (MY_EMAIL) is not set"));
        }
        if self.username.trim().is_empty() {
            return Err(HbdError::config("mail.username (MAIL_USERNAME) is not set"));
        }
        if self.smtp_host.trim().is_empty() {
            return Err(HbdError::config("mail.smtp_host is empty"));
        }
        Ok(())
    }
}

/// When the daily scan fires, in local wall-clock time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_hour")]
    pub hour: u32,
    #[serde(default)]
    pub minute: u32,
}

fn default_hour() -> u32 { 7 }

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            hour: default_hour(),
            minute: 0,
        }
    }
}
