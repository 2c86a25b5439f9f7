//! Daily birthday scan — find today's matches, refresh ages, send reminders,
//! write the notification log.
//!
//! Each matching record goes through four steps:
//!
//! ```text
//! age = calculate_age(date, today)      -- failure skips the rest
//!   ├── store.update_age(id, age)       -- best-effort
//!   ├── notifier.send(reminder)         -- best-effort
//!   └── store.append_notification_log   -- best-effort, runs even if send failed
//! ```
//!
//! Errors stop at the record boundary and end up in the [`RecordOutcome`];
//! only the initial match query can fail the whole run. There is no
//! "already sent today" guard, so running twice on one day sends twice.

use chrono::NaiveDate;
use hbd_core::error::{HbdError, Result};
use hbd_core::traits::{Clock, RecordStore};
use hbd_core::types::{BirthdayRecord, MonthDay};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::age::calculate_age;
use crate::notify::Notifier;

/// Result of one step for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StepResult {
    Done,
    Failed(String),
    /// Not attempted because an earlier step it depends on failed.
    Skipped,
}

impl StepResult {
    fn from_result<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Self::Done,
            Err(e) => Self::Failed(e.to_string()),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Overall verdict for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeStatus {
    Success,
    PartialFailure,
    Failure,
}

/// Everything that happened to one matching record during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordOutcome {
    pub birthday_id: i64,
    pub name: String,
    /// Freshly computed age, if the stored date parsed.
    pub age: Option<u32>,
    pub age_calc: StepResult,
    pub age_update: StepResult,
    pub delivery: StepResult,
    pub log_write: StepResult,
    pub log_entry_id: Option<i64>,
}

impl RecordOutcome {
    fn new(record: &BirthdayRecord) -> Self {
        Self {
            birthday_id: record.id,
            name: record.name.clone(),
            age: None,
            age_calc: StepResult::Skipped,
            age_update: StepResult::Skipped,
            delivery: StepResult::Skipped,
            log_write: StepResult::Skipped,
            log_entry_id: None,
        }
    }

    pub fn status(&self) -> OutcomeStatus {
        let steps = [&self.age_update, &self.delivery, &self.log_write];
        if !self.age_calc.is_done() || steps.iter().all(|s| !s.is_done()) {
            OutcomeStatus::Failure
        } else if steps.iter().all(|s| s.is_done()) {
            OutcomeStatus::Success
        } else {
            OutcomeStatus::PartialFailure
        }
    }
}

/// What one run of the job did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub date: NaiveDate,
    pub outcomes: Vec<RecordOutcome>,
}

impl ScanReport {
    pub fn matched(&self) -> usize {
        self.outcomes.len()
    }

    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status() == status).count()
    }

    pub fn outcome(&self, birthday_id: i64) -> Option<&RecordOutcome> {
        self.outcomes.iter().find(|o| o.birthday_id == birthday_id)
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} match(es), {} ok, {} partial, {} failed",
            self.date,
            self.matched(),
            self.count(OutcomeStatus::Success),
            self.count(OutcomeStatus::PartialFailure),
            self.count(OutcomeStatus::Failure),
        )
    }
}

/// The daily scan job. Holds no state between runs.
pub struct DailyScanJob {
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl DailyScanJob {
    pub fn new(notifier: Notifier, clock: Arc<dyn Clock>) -> Self {
        Self { notifier, clock }
    }

    /// Process every record whose month-day is today, in ascending id order.
    /// Fails only if the match query itself fails.
    pub async fn run(&self, store: &dyn RecordStore) -> Result<ScanReport> {
        let today = self.clock.today();
        let month_day = MonthDay::of(today);
        let matches = store.list_matching_month_day(month_day)?;
        tracing::info!("🎉 Birthday scan {today}: {} match(es) for {month_day}", matches.len());

        let mut outcomes = Vec::with_capacity(matches.len());
        for record in &matches {
            outcomes.push(self.process(store, record, today).await);
        }

        let report = ScanReport {
            date: today,
            outcomes,
        };
        tracing::info!("✅ Birthday scan done — {report}");
        Ok(report)
    }

    async fn process(
        &self,
        store: &dyn RecordStore,
        record: &BirthdayRecord,
        today: NaiveDate,
    ) -> RecordOutcome {
        let mut outcome = RecordOutcome::new(record);

        let age = match calculate_age(&record.date, today) {
            Ok(age) => age,
            Err(e) => {
                tracing::error!(
                    birthday_id = record.id,
                    name = %record.name,
                    "❌ Cannot compute age from '{}': {e}",
                    record.date
                );
                outcome.age_calc = StepResult::Failed(e.to_string());
                return outcome;
            }
        };
        outcome.age = Some(age);
        outcome.age_calc = StepResult::Done;

        let updated = store.update_age(record.id, age);
        if let Err(e) = &updated {
            tracing::error!(
                birthday_id = record.id,
                name = %record.name,
                "❌ Failed to update age to {age}: {e}"
            );
        }
        outcome.age_update = StepResult::from_result(&updated);

        let notification = self.notifier.compose(record, age, self.clock.now());
        let sent = self.notifier.send(&notification).await;
        if let Err(e) = &sent {
            tracing::error!(
                birthday_id = record.id,
                name = %record.name,
                "❌ Failed to send birthday email: {e}"
            );
        }
        outcome.delivery = StepResult::from_result(&sent);

        let logged = store
            .append_notification_log(record.id, &notification.body, notification.timestamp)
            .map_err(|e| match e {
                HbdError::LogWrite(_) => e,
                other => HbdError::log_write(other.to_string()),
            });
        match &logged {
            Ok(entry_id) => outcome.log_entry_id = Some(*entry_id),
            Err(e) => tracing::error!(
                birthday_id = record.id,
                name = %record.name,
                "❌ Failed to log notification: {e}"
            ),
        }
        outcome.log_write = StepResult::from_result(&logged);

        outcome
    }
}
