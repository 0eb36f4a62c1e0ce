//! CoinGecko provider.
//!
//! Uses the public v3 API:
//! - latest: `/simple/price?ids={id}&vs_currencies={currency}`
//! - historical: `/coins/{id}/history?date=DD-MM-YYYY` (daily snapshot at 00:00 UTC)
//!
//! CoinGecko addresses coins by id ("ethereum") rather than ticker ("ETH"),
//! see [`coin_id`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::provider::{http_client, ProviderCapabilities, RateProvider};

const PROVIDER_NAME: &str = "coingecko";

/// Public API root.
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    market_data: Option<MarketData>,
}

#[derive(Debug, Deserialize)]
struct MarketData {
    current_price: HashMap<String, f64>,
}

/// `/simple/price` body: `{ "ethereum": { "usd": 1834.2 } }`
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, super::DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, MarketDataError> {
        log::debug!("coingecko request: {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::provider(
                PROVIDER_NAME,
                format!("unexpected status {}: {}", status, body),
            ));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| MarketDataError::invalid_response(PROVIDER_NAME, e.to_string()))
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a ticker to a CoinGecko coin id. Unknown tickers are assumed to
/// already be ids.
pub fn coin_id(token: &str) -> String {
    match token.to_ascii_uppercase().as_str() {
        "ETH" => "ethereum".to_string(),
        "BTC" => "bitcoin".to_string(),
        "KNC" => "kyber-network-crystal".to_string(),
        "USDT" => "tether".to_string(),
        "USDC" => "usd-coin".to_string(),
        "DAI" => "dai".to_string(),
        _ => token.to_ascii_lowercase(),
    }
}

fn history_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%d-%m-%Y").to_string()
}

fn extract_history_price(
    body: HistoryResponse,
    currency: &str,
    date: &str,
) -> Result<f64, MarketDataError> {
    let market_data = body.market_data.ok_or_else(|| MarketDataError::OutOfRange {
        provider: PROVIDER_NAME.to_string(),
        message: format!("no market data on {}", date),
    })?;
    market_data
        .current_price
        .get(&currency.to_ascii_lowercase())
        .copied()
        .ok_or_else(|| {
            MarketDataError::invalid_response(PROVIDER_NAME, format!("no {} price", currency))
        })
}

fn extract_simple_price(
    body: &SimplePriceResponse,
    id: &str,
    currency: &str,
) -> Result<f64, MarketDataError> {
    body.get(id)
        .and_then(|prices| prices.get(&currency.to_ascii_lowercase()))
        .copied()
        .ok_or_else(|| {
            MarketDataError::invalid_response(PROVIDER_NAME, format!("no {}/{} price", id, currency))
        })
}

#[async_trait]
impl RateProvider for CoinGeckoProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::full_history()
    }

    async fn rate(
        &self,
        token: &str,
        currency: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<f64, MarketDataError> {
        let id = coin_id(token);
        let date = history_date(timestamp);
        let url = format!(
            "{}/coins/{}/history?date={}&localization=false",
            self.base_url, id, date
        );
        let body: HistoryResponse = self.get_json(&url).await?;
        extract_history_price(body, currency, &date)
    }

    async fn current_rate(&self, token: &str, currency: &str) -> Result<f64, MarketDataError> {
        let id = coin_id(token);
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.base_url,
            id,
            currency.to_ascii_lowercase()
        );
        let body: SimplePriceResponse = self.get_json(&url).await?;
        extract_simple_price(&body, &id, currency)
    }
}
