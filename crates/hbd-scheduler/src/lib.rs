//! # hbd Scheduler
//!
//! The daily birthday check and everything it needs.
//!
//! ```text
//! run_daily (tokio sleep until HH:MM)
//!   └── DailyScanJob::run(store)
//!         ├── store.list_matching_month_day(today)
//!         └── per record: age → update_age → Notifier::send → append_notification_log
//! ```

pub mod age;
pub mod engine;
pub mod job;
pub mod notify;
pub mod schedule;

pub use age::{age_on, calculate_age};
pub use engine::run_daily;
pub use job::{DailyScanJob, OutcomeStatus, RecordOutcome, ScanReport, StepResult};
pub use notify::{Notification, Notifier};
pub use schedule::DailySchedule;
