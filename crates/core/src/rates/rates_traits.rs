use async_trait::async_trait;
use chrono::NaiveDate;

use super::rates_model::PriceRecord;
use crate::errors::Result;

/// Persistence contract for resolved prices.
///
/// Absence must be reported as `DatabaseError::NotFound`, never as a zero
/// price.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Inserts or replaces the record for its (token, currency, provider, date) key.
    async fn save_token_price(&self, record: &PriceRecord) -> Result<()>;

    fn get_token_price(
        &self,
        token: &str,
        currency: &str,
        provider: &str,
        date: NaiveDate,
    ) -> Result<f64>;
}

/// Contract for rate resolution.
#[async_trait]
pub trait RateServiceTrait: Send + Sync {
    /// Live rate, never cached.
    async fn current_rate(&self, token: &str, currency: &str) -> Result<f64>;

    /// Rate at `date`: live for today, cache-first for past dates.
    async fn historical_rate(&self, token: &str, currency: &str, date: NaiveDate) -> Result<f64>;
}
