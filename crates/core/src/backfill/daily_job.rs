use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::backfill_errors::BackfillError;
use super::backfiller::Backfiller;
use crate::constants::JOB_TIME_FORMAT;

/// Parses a `HH:MM:SS` wall-clock time.
pub fn parse_job_time(value: &str) -> Result<NaiveTime, BackfillError> {
    NaiveTime::parse_from_str(value.trim(), JOB_TIME_FORMAT)
        .map_err(|_| BackfillError::ScheduleConfig(value.to_string()))
}

/// Next occurrence of `run_at` (UTC) strictly after `now`.
pub fn next_run_after(run_at: NaiveTime, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive().and_time(run_at).and_utc();
    if today > now {
        today
    } else {
        today + ChronoDuration::days(1)
    }
}

/// Time left until the next occurrence of `run_at` (UTC) strictly after `now`.
pub fn duration_until_next(run_at: NaiveTime, now: DateTime<Utc>) -> Duration {
    (next_run_after(run_at, now) - now).to_std().unwrap_or_default()
}

/// One firing of the daily job: fills the UTC date of `now - 24h`.
pub async fn run_once(backfiller: &Backfiller, now: DateTime<Utc>) -> usize {
    let date = (now - ChronoDuration::hours(24)).date_naive();
    info!(
        "Daily job filling {}/{} for {}",
        backfiller.token(),
        backfiller.currency(),
        date
    );
    let saved = backfiller.fill_date(date).await;
    info!(
        "Daily job saved {}/{} record(s) for {}",
        saved,
        backfiller.providers().len(),
        date
    );
    saved
}

/// Recurring catch-up job firing once a day at a fixed UTC time.
///
/// The job runs on its own task until [`DailyJob::shutdown`] is called or the
/// job value is dropped. A failing firing never stops later ones.
pub struct DailyJob {
    run_at: NaiveTime,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl DailyJob {
    /// Validates `running_time` and spawns the job loop.
    pub fn schedule(backfiller: Arc<Backfiller>, running_time: &str) -> Result<Self, BackfillError> {
        Self::schedule_with_clock(backfiller, running_time, Utc::now)
    }

    /// Each firing is bound to its scheduled instant, and the following one
    /// is computed from no earlier than that instant, so a timer waking
    /// slightly ahead of the wall clock cannot fire the same date twice.
    fn schedule_with_clock<C>(
        backfiller: Arc<Backfiller>,
        running_time: &str,
        clock: C,
    ) -> Result<Self, BackfillError>
    where
        C: Fn() -> DateTime<Utc> + Send + 'static,
    {
        let run_at = parse_job_time(running_time)?;
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            info!("Daily job armed for {} UTC", run_at);
            let mut after = clock();
            loop {
                let next = next_run_after(run_at, after);
                let wait = (next - clock()).to_std().unwrap_or_default();
                debug!("Next daily job run at {} (in {}s)", next, wait.as_secs());

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {
                        run_once(&backfiller, next).await;
                        after = clock().max(next);
                    }
                    _ = shutdown_rx.changed() => {
                        info!("Daily job stopped");
                        break;
                    }
                }
            }
        });

        Ok(Self {
            run_at,
            shutdown_tx,
            handle,
        })
    }

    pub fn run_at(&self) -> NaiveTime {
        self.run_at
    }

    /// Signals the loop to stop and waits for it. A firing in progress is
    /// allowed to finish first.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            warn!("Daily job task ended abnormally: {}", e);
        }
    }
}
