use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::sync::Arc;
use tokenrate_market_data::{validate_rate, MarketDataError, RateProvider};

use super::rates_errors::RateError;
use super::rates_model::PriceRecord;
use super::rates_traits::{PriceStore, RateServiceTrait};
use crate::errors::Result;
use crate::utils::time_utils::{day_start, today_utc};

/// Resolves rates over an ordered provider list backed by a [`PriceStore`].
///
/// Providers are tried in the configured order and the first success wins.
/// Today's rate is always fetched live; past dates are served from the store
/// when any configured provider has a record for them, and written back
/// under the answering provider's name otherwise.
#[derive(Clone)]
pub struct RateService {
    providers: Vec<Arc<dyn RateProvider>>,
    store: Arc<dyn PriceStore>,
}

impl RateService {
    pub fn new(providers: Vec<Arc<dyn RateProvider>>, store: Arc<dyn PriceStore>) -> Self {
        Self { providers, store }
    }

    pub fn providers(&self) -> &[Arc<dyn RateProvider>] {
        &self.providers
    }

    fn log_provider_failure(provider: &str, token: &str, currency: &str, err: &MarketDataError) {
        if err.is_unanswerable_timestamp() {
            debug!(
                "Provider '{}' cannot answer {}/{}: {}, trying next",
                provider, token, currency, err
            );
        } else {
            warn!(
                "Provider '{}' failed for {}/{}: {}, trying next",
                provider, token, currency, err
            );
        }
    }

    fn all_failed(&self, token: &str, currency: &str, date: NaiveDate) -> RateError {
        RateError::AllProvidersFailed {
            token: token.to_string(),
            currency: currency.to_string(),
            date,
            tried: self.providers.len(),
        }
    }

    /// Looks for a stored price under each configured provider's key, in
    /// provider order. Any store error other than "not found" aborts.
    fn cached_rate(&self, token: &str, currency: &str, date: NaiveDate) -> Result<Option<f64>> {
        for provider in &self.providers {
            match self
                .store
                .get_token_price(token, currency, provider.name(), date)
            {
                Ok(price) => {
                    debug!(
                        "Cache hit for {}/{} on {} under '{}'",
                        token,
                        currency,
                        date,
                        provider.name()
                    );
                    return Ok(Some(price));
                }
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    async fn fetch_and_store(&self, token: &str, currency: &str, date: NaiveDate) -> Result<f64> {
        let timestamp = day_start(date);

        for provider in &self.providers {
            let name = provider.name();
            let answer = provider.rate(token, currency, timestamp).await;
            match answer.and_then(|price| validate_rate(name, price)) {
                Ok(price) => {
                    info!(
                        "Resolved {}/{} on {} from '{}': {}",
                        token, currency, date, name, price
                    );
                    let record = PriceRecord::new(token, currency, name, date, price);
                    if let Err(e) = self.store.save_token_price(&record).await {
                        warn!(
                            "Failed to cache {}/{} on {} from '{}': {}",
                            token, currency, date, name, e
                        );
                    }
                    return Ok(price);
                }
                Err(e) => Self::log_provider_failure(name, token, currency, &e),
            }
        }

        Err(self.all_failed(token, currency, date).into())
    }
}

#[async_trait]
impl RateServiceTrait for RateService {
    async fn current_rate(&self, token: &str, currency: &str) -> Result<f64> {
        for provider in &self.providers {
            let answer = provider.current_rate(token, currency).await;
            match answer.and_then(|price| validate_rate(provider.name(), price)) {
                Ok(price) => return Ok(price),
                Err(e) => Self::log_provider_failure(provider.name(), token, currency, &e),
            }
        }

        Err(self.all_failed(token, currency, today_utc()).into())
    }

    async fn historical_rate(&self, token: &str, currency: &str, date: NaiveDate) -> Result<f64> {
        let today = today_utc();
        if date > today {
            return Err(RateError::FutureDate(date).into());
        }
        if date == today {
            return self.current_rate(token, currency).await;
        }

        if let Some(price) = self.cached_rate(token, currency, date)? {
            return Ok(price);
        }

        debug!(
            "No stored {}/{} rate for {}, falling back to providers",
            token, currency, date
        );
        self.fetch_and_store(token, currency, date).await
    }
}
