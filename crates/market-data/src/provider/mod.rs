//! Rate provider abstractions and implementations.
//!
//! This module contains:
//! - The `RateProvider` trait that all providers implement
//! - Provider capabilities
//! - Concrete provider implementations (CoinGecko, CoinLib, Gemini, tokenrate API)

mod capabilities;
mod traits;

pub mod coingecko;
pub mod coinlib;
pub mod gemini;
pub mod tokenrate_api;

pub use capabilities::ProviderCapabilities;
pub use coingecko::CoinGeckoProvider;
pub use coinlib::CoinLibProvider;
pub use gemini::GeminiProvider;
pub use tokenrate_api::TokenRateApiProvider;
pub use traits::RateProvider;

use std::time::Duration;

use crate::errors::MarketDataError;

/// Default HTTP request timeout for provider clients.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Accepts `price` only when it is a finite, non-negative rate.
///
/// Callers run every provider answer through this before using or storing
/// it, so a malformed value counts as a provider failure.
pub fn validate_rate(provider: &str, price: f64) -> Result<f64, MarketDataError> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(MarketDataError::invalid_response(
            provider,
            format!("rate {} is not a finite non-negative number", price),
        ))
    }
}
