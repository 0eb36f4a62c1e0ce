//! Rate provider trait definition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::capabilities::ProviderCapabilities;
use crate::errors::MarketDataError;
use crate::models::{ETH_ID, USD_ID};

/// Trait for token/fiat rate providers.
///
/// Implement this trait to add support for a new data source. Callers keep
/// providers in a fixed, configured order and take the first success.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use tokenrate_market_data::{MarketDataError, ProviderCapabilities, RateProvider};
///
/// struct FixedRate;
///
/// #[async_trait]
/// impl RateProvider for FixedRate {
///     fn name(&self) -> &'static str {
///         "fixed"
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities::full_history()
///     }
///
///     async fn rate(&self, _token: &str, _currency: &str, _timestamp: DateTime<Utc>)
///         -> Result<f64, MarketDataError> {
///         Ok(100.0)
///     }
/// }
/// ```
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Stable identifier of this provider.
    ///
    /// Used as the provider discriminator of persisted prices, so it must
    /// never change between releases.
    fn name(&self) -> &'static str;

    /// Describes which queries this provider can answer.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Rate of `token` in `currency` at `timestamp` (historical query path).
    ///
    /// Timestamps the provider cannot answer must be rejected with
    /// [`MarketDataError::OutOfRange`] or [`MarketDataError::NotSupported`],
    /// never answered with an approximate value.
    async fn rate(
        &self,
        token: &str,
        currency: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<f64, MarketDataError>;

    /// Live rate of `token` in `currency`.
    ///
    /// Defaults to the historical path at the current instant.
    async fn current_rate(&self, token: &str, currency: &str) -> Result<f64, MarketDataError> {
        self.rate(token, currency, Utc::now()).await
    }

    /// ETH/USD rate at `timestamp`.
    async fn usd_rate(&self, timestamp: DateTime<Utc>) -> Result<f64, MarketDataError> {
        self.rate(ETH_ID, USD_ID, timestamp).await
    }
}
