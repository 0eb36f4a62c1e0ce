//! Gemini exchange provider.
//!
//! Gemini has no price history endpoint; the rate is the price of the
//! trade returned for `since=<timestamp>`. Its precision therefore depends
//! on trading activity around the requested time, and the public trade
//! history only reaches back one week.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::provider::{http_client, ProviderCapabilities, RateProvider};

const PROVIDER_NAME: &str = "gemini";

/// Public API root.
pub const DEFAULT_BASE_URL: &str = "https://api.gemini.com/v1";

/// A trade further than this from the requested time is not accepted.
const ACCEPTED_VARIATION_SECS: i64 = 3600;

const MAX_HISTORY_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
struct Trade {
    timestamp: i64,
    price: String,
}

pub struct GeminiProvider {
    client: Client,
    base_url: String,
}

impl GeminiProvider {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, super::DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn trades(&self, url: &str) -> Result<Vec<Trade>, MarketDataError> {
        log::debug!("gemini request: {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::provider(
                PROVIDER_NAME,
                format!("unexpected status code: {}", status),
            ));
        }
        response
            .json::<Vec<Trade>>()
            .await
            .map_err(|e| MarketDataError::invalid_response(PROVIDER_NAME, e.to_string()))
    }
}

impl Default for GeminiProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn symbol(token: &str, currency: &str) -> String {
    format!(
        "{}{}",
        token.to_ascii_lowercase(),
        currency.to_ascii_lowercase()
    )
}

/// Picks the price of the first trade, provided it is close enough to
/// `query_time` (unix seconds).
fn price_near(trades: &[Trade], query_time: i64) -> Result<f64, MarketDataError> {
    let trade = trades.first().ok_or_else(|| {
        MarketDataError::invalid_response(PROVIDER_NAME, "unexpected response data set is empty")
    })?;
    if (trade.timestamp - query_time).abs() >= ACCEPTED_VARIATION_SECS {
        return Err(MarketDataError::OutOfRange {
            provider: PROVIDER_NAME.to_string(),
            message: "price is out of date".to_string(),
        });
    }
    trade
        .price
        .parse::<f64>()
        .map_err(|e| MarketDataError::invalid_response(PROVIDER_NAME, e.to_string()))
}

#[async_trait]
impl RateProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_latest: true,
            supports_historical: true,
            max_history: Some(ChronoDuration::days(MAX_HISTORY_DAYS)),
        }
    }

    async fn rate(
        &self,
        token: &str,
        currency: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<f64, MarketDataError> {
        let now = Utc::now();
        if !self.capabilities().covers(timestamp, now) {
            return Err(MarketDataError::OutOfRange {
                provider: PROVIDER_NAME.to_string(),
                message: format!(
                    "gemini doesn't support queries older than {} days",
                    MAX_HISTORY_DAYS
                ),
            });
        }
        let query_time = timestamp.timestamp();
        let url = format!(
            "{}/trades/{}?since={}&limit_trades=1",
            self.base_url,
            symbol(token, currency),
            query_time
        );
        let trades = self.trades(&url).await?;
        price_near(&trades, query_time)
    }

    async fn current_rate(&self, token: &str, currency: &str) -> Result<f64, MarketDataError> {
        let url = format!(
            "{}/trades/{}?limit_trades=1",
            self.base_url,
            symbol(token, currency)
        );
        let trades = self.trades(&url).await?;
        price_near(&trades, Utc::now().timestamp())
    }
}
