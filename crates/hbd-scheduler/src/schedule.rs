//! Daily fire time — "every day at HH:MM" in the clock's wall time.
//! No cron crate, no timezone database: the scan fires once per calendar
//! day at a fixed hour.

use chrono::{DateTime, Duration, NaiveTime, TimeZone};
use hbd_core::config::ScheduleConfig;
use hbd_core::error::{HbdError, Result};

/// A fixed wall-clock time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
}

impl DailySchedule {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        let at = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
            HbdError::config(format!("Invalid schedule time {hour:02}:{minute:02}"))
        })?;
        Ok(Self { at })
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        Self::new(config.hour, config.minute)
    }

    pub fn time(&self) -> NaiveTime {
        self.at
    }

    /// First fire time strictly after `after`, in the same timezone.
    /// Skips days where HH:MM does not exist (DST gap); on an ambiguous
    /// local time the earlier instant wins.
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = after.timezone();
        let mut day = after.date_naive();
        // Two DST transitions never fall on consecutive days.
        for _ in 0..3 {
            if let Some(candidate) = tz.from_local_datetime(&day.and_time(self.at)).earliest() {
                if candidate > *after {
                    return Some(candidate);
                }
            }
            day = day.succ_opt()?;
        }
        None
    }

    /// How long to sleep from `now` until the next fire time.
    pub fn until_next<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<std::time::Duration> {
        let next = self.next_after(now)?;
        let wait: Duration = next - now.clone();
        wait.to_std().ok()
    }
}

impl Default for DailySchedule {
    fn default() -> Self {
        let cfg = ScheduleConfig::default();
        Self {
            at: NaiveTime::from_hms_opt(cfg.hour, cfg.minute, 0).unwrap_or_default(),
        }
    }
}
