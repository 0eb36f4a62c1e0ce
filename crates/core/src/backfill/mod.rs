//! Range backfill and the recurring daily catch-up job.

mod backfill_errors;
mod backfiller;
mod daily_job;
mod date_range;

#[cfg(test)]
mod test_mocks;

pub use backfill_errors::BackfillError;
pub use backfiller::{BackfillReport, Backfiller};
pub use daily_job::{duration_until_next, next_run_after, parse_job_time, run_once, DailyJob};
pub use date_range::DateRange;
