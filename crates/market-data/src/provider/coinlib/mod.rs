//! CoinLib provider.
//!
//! CoinLib only serves the current price and allows 180 requests per hour,
//! so answers are kept for five minutes per token/currency pair.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::errors::MarketDataError;
use crate::provider::{http_client, ProviderCapabilities, RateProvider};

const PROVIDER_NAME: &str = "coinlib";

/// Public API root.
pub const DEFAULT_BASE_URL: &str = "https://coinlib.io/api/v1";

/// How long a fetched price is served from memory.
const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Deserialize)]
struct CoinResponse {
    price: f64,
    #[serde(default)]
    remaining: Option<i64>,
}

pub struct CoinLibProvider {
    client: Client,
    base_url: String,
    api_key: String,
    cache: Mutex<HashMap<(String, String), (Instant, f64)>>,
}

impl CoinLibProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL, super::DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_base_url(api_key: String, base_url: &str, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cached(&self, key: &(String, String)) -> Option<f64> {
        let cache = self.cache.lock().ok()?;
        cache
            .get(key)
            .filter(|(fetched_at, _)| fetched_at.elapsed() < CACHE_TTL)
            .map(|(_, price)| *price)
    }

    fn remember(&self, key: (String, String), price: f64) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, (Instant::now(), price));
        }
    }

    async fn fetch(&self, token: &str, currency: &str) -> Result<f64, MarketDataError> {
        let url = format!("{}/coin", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("pref", currency),
                ("symbol", token),
            ])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(MarketDataError::provider(
                PROVIDER_NAME,
                format!("unexpected status {}: {}", status, body),
            ));
        }
        let coin: CoinResponse = serde_json::from_str(&body)
            .map_err(|e| MarketDataError::invalid_response(PROVIDER_NAME, e.to_string()))?;
        if let Some(remaining) = coin.remaining {
            log::debug!("coinlib requests remaining this hour: {}", remaining);
        }
        Ok(coin.price)
    }
}

#[async_trait]
impl RateProvider for CoinLibProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::latest_only()
    }

    async fn rate(
        &self,
        token: &str,
        currency: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<f64, MarketDataError> {
        if timestamp.date_naive() != Utc::now().date_naive() {
            return Err(MarketDataError::NotSupported {
                operation: "historical rate".to_string(),
                provider: PROVIDER_NAME.to_string(),
            });
        }
        self.current_rate(token, currency).await
    }

    async fn current_rate(&self, token: &str, currency: &str) -> Result<f64, MarketDataError> {
        let key = (token.to_ascii_uppercase(), currency.to_ascii_uppercase());
        if let Some(price) = self.cached(&key) {
            return Ok(price);
        }
        let price = self.fetch(&key.0, &key.1).await?;
        self.remember(key, price);
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[tokio::test]
    async fn test_rejects_past_dates_without_network() {
        let provider = CoinLibProvider::with_base_url(
            "key".to_string(),
            "http://127.0.0.1:9",
            Duration::from_millis(50),
        );
        let err = provider
            .rate("ETH", "USD", Utc::now() - ChronoDuration::days(2))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketDataError::NotSupported { .. }));
    }

    #[tokio::test]
    async fn test_serves_cached_price() {
        let provider = CoinLibProvider::with_base_url(
            "key".to_string(),
            "http://127.0.0.1:9",
            Duration::from_millis(50),
        );
        provider.remember(("ETH".to_string(), "USD".to_string()), 1500.0);
        let price = provider.current_rate("eth", "usd").await.unwrap();
        assert_eq!(price, 1500.0);
    }

    #[test]
    fn test_decode_response() {
        let coin: CoinResponse =
            serde_json::from_str(r#"{"symbol":"ETH","price":1834.55,"name":"Ethereum","remaining":179}"#)
                .unwrap();
        assert_eq!(coin.price, 1834.55);
        assert_eq!(coin.remaining, Some(179));
    }

    #[test]
    fn test_capabilities() {
        let provider = CoinLibProvider::new("key".to_string());
        assert_eq!(provider.name(), "coinlib");
        assert!(!provider.capabilities().supports_historical);
    }
}
