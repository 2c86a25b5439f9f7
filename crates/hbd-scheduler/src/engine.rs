//! Scheduler loop — sleeps until the daily fire time, then runs the job.
//! One tokio timer, zero work while idle. Runs are strictly sequential.

use std::future::Future;
use std::time::Duration;

use chrono::Local;
use hbd_core::error::Result;

use crate::job::ScanReport;
use crate::schedule::DailySchedule;

/// Fallback wait if the next fire time cannot be computed.
const RETRY_WAIT: Duration = Duration::from_secs(3600);

/// Run `job` once per day at `schedule`, forever.
///
/// The job takes no arguments; it opens whatever it needs (the store
/// connection) for the duration of one run. A failed run is logged and the
/// loop waits for the next day.
pub async fn run_daily<F, Fut>(schedule: DailySchedule, mut job: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ScanReport>>,
{
    tracing::info!(
        "⏰ Scheduler started (daily at {})",
        schedule.time().format("%H:%M")
    );

    loop {
        let now = Local::now();
        let wait = match schedule.until_next(&now) {
            Some(wait) => wait,
            None => {
                tracing::warn!("⚠️ Could not compute next fire time after {now}, retrying in 1h");
                RETRY_WAIT
            }
        };
        tracing::debug!("⏳ Next birthday scan in {}s", wait.as_secs());
        tokio::time::sleep(wait).await;

        match job().await {
            Ok(report) => tracing::info!("📣 Daily run finished: {report}"),
            Err(e) => tracing::error!("❌ Daily run failed: {e}"),
        }
    }
}
