use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackfillError {
    #[error("invalid date range: from {from} is after to {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    /// At least one provider walk aborted. `first` describes the first
    /// failure in provider order.
    #[error("backfill failed for {failed} provider(s), first error: {first}")]
    Failed { failed: usize, first: String },

    #[error("invalid job running time '{0}', expected HH:MM:SS")]
    ScheduleConfig(String),
}
