use chrono::NaiveDate;

use super::backfill_errors::BackfillError;
use crate::utils::time_utils::get_days_between;

/// Inclusive `[from, to]` day range, never ending after today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Resolves user input into a range.
    ///
    /// Absent bounds default to `today`, `to` is clamped to `today`, and a
    /// `from` after the (clamped) `to` is rejected.
    pub fn resolve(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Self, BackfillError> {
        let from = from.unwrap_or(today);
        let to = to.unwrap_or(today).min(today);

        if from > to {
            return Err(BackfillError::InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Every day of the range in ascending order.
    pub fn days(&self) -> Vec<NaiveDate> {
        get_days_between(self.from, self.to)
    }
}
