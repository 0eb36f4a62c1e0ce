//! Provider backed by another tokenrate HTTP service.
//!
//! The service always answers with HTTP 200; failures are carried in the
//! body (`failed`, `error`) and turned into provider errors here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::PriceResponse;
use crate::provider::{http_client, ProviderCapabilities, RateProvider};

const PROVIDER_NAME: &str = "tokenrate-api";

pub struct TokenRateApiProvider {
    client: Client,
    base_url: String,
}

impl TokenRateApiProvider {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, super::DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn price_url(&self, token: &str, currency: &str) -> String {
        format!(
            "{}/price/{}-{}",
            self.base_url,
            token.to_ascii_lowercase(),
            currency.to_ascii_lowercase()
        )
    }

    async fn query(&self, url: &str, date: Option<String>) -> Result<f64, MarketDataError> {
        let mut request = self.client.get(url);
        if let Some(date) = date {
            request = request.query(&[("date", date)]);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::provider(
                PROVIDER_NAME,
                format!("unexpected http code {}", status),
            ));
        }
        let body: PriceResponse = response
            .json()
            .await
            .map_err(|e| MarketDataError::invalid_response(PROVIDER_NAME, e.to_string()))?;
        price_from_body(body)
    }
}

fn price_from_body(body: PriceResponse) -> Result<f64, MarketDataError> {
    if body.failed {
        return Err(MarketDataError::provider(
            PROVIDER_NAME,
            format!("get rate failed with reason: {}", body.error),
        ));
    }
    Ok(body.price)
}

#[async_trait]
impl RateProvider for TokenRateApiProvider {
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
        let date = timestamp.format("%Y-%m-%d").to_string();
        self.query(&self.price_url(token, currency), Some(date))
            .await
    }

    async fn current_rate(&self, token: &str, currency: &str) -> Result<f64, MarketDataError> {
        self.query(&self.price_url(token, currency), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_url() {
        let provider = TokenRateApiProvider::new("http://localhost:8000/");
        assert_eq!(
            provider.price_url("ETH", "USD"),
            "http://localhost:8000/price/eth-usd"
        );
    }

    #[test]
    fn test_failed_body_is_an_error() {
        let err = price_from_body(PriceResponse::failure("ETH", "USD", "cannot query for future date"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Provider error: tokenrate-api - get rate failed with reason: cannot query for future date"
        );
    }

    #[test]
    fn test_successful_body() {
        let price = price_from_body(PriceResponse::success("ETH", "USD", 100.0)).unwrap();
        assert_eq!(price, 100.0);
    }
}
