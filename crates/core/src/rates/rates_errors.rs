use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RateError {
    /// The requested date lies after today (UTC).
    #[error("cannot query for future date {0}")]
    FutureDate(NaiveDate),

    /// Every configured provider failed (or none is configured).
    #[error("get {token}/{currency} rate for {date} failed after trying {tried} provider(s)")]
    AllProvidersFailed {
        token: String,
        currency: String,
        date: NaiveDate,
        tried: usize,
    },
}
