//! Provider factory.
//!
//! Builds the ordered provider list from configured names. The order of
//! `names` is the fallback order used by every caller.

use std::sync::Arc;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::provider::{
    coingecko, coinlib, gemini, CoinGeckoProvider, CoinLibProvider, GeminiProvider,
    RateProvider, TokenRateApiProvider, DEFAULT_REQUEST_TIMEOUT,
};

/// Providers that can be built from settings alone, in default order.
pub const ALL_PROVIDERS: &[&str] = &["coingecko", "coinlib", "gemini"];

/// Settings consumed by [`build_providers`].
#[derive(Clone, Debug)]
pub struct ProviderSettings {
    pub coinlib_key: String,
    pub coingecko_base_url: String,
    pub coinlib_base_url: String,
    pub gemini_base_url: String,
    /// Root URL of an upstream tokenrate service, required for `tokenrate-api`.
    pub tokenrate_api_url: Option<String>,
    pub request_timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            coinlib_key: String::new(),
            coingecko_base_url: coingecko::DEFAULT_BASE_URL.to_string(),
            coinlib_base_url: coinlib::DEFAULT_BASE_URL.to_string(),
            gemini_base_url: gemini::DEFAULT_BASE_URL.to_string(),
            tokenrate_api_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

fn build_provider(
    name: &str,
    settings: &ProviderSettings,
) -> Result<Arc<dyn RateProvider>, MarketDataError> {
    let timeout = settings.request_timeout;
    let provider: Arc<dyn RateProvider> = match name {
        "coingecko" => Arc::new(CoinGeckoProvider::with_base_url(
            &settings.coingecko_base_url,
            timeout,
        )),
        "coinlib" => Arc::new(CoinLibProvider::with_base_url(
            settings.coinlib_key.clone(),
            &settings.coinlib_base_url,
            timeout,
        )),
        "gemini" => Arc::new(GeminiProvider::with_base_url(
            &settings.gemini_base_url,
            timeout,
        )),
        "tokenrate-api" => {
            let url = settings.tokenrate_api_url.as_deref().ok_or_else(|| {
                MarketDataError::provider(name, "upstream tokenrate URL is not configured")
            })?;
            Arc::new(TokenRateApiProvider::with_timeout(url, timeout))
        }
        other => return Err(MarketDataError::UnknownProvider(other.to_string())),
    };
    Ok(provider)
}

/// Builds providers for `names`, preserving their order.
///
/// Names are matched case-insensitively and surrounding whitespace is
/// ignored. An unknown name fails the whole call.
pub fn build_providers<S: AsRef<str>>(
    names: &[S],
    settings: &ProviderSettings,
) -> Result<Vec<Arc<dyn RateProvider>>, MarketDataError> {
    names
        .iter()
        .map(|name| build_provider(&name.as_ref().trim().to_ascii_lowercase(), settings))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_preserves_order() {
        let providers =
            build_providers(&["gemini", "coingecko"], &ProviderSettings::default()).unwrap();
        let names: Vec<_> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["gemini", "coingecko"]);
    }

    #[test]
    fn test_build_all() {
        let providers = build_providers(ALL_PROVIDERS, &ProviderSettings::default()).unwrap();
        assert_eq!(providers.len(), 3);
    }

    #[test]
    fn test_names_are_normalized() {
        let providers =
            build_providers(&[" CoinGecko "], &ProviderSettings::default()).unwrap();
        assert_eq!(providers[0].name(), "coingecko");
    }

    #[test]
    fn test_unknown_provider() {
        let err = build_providers(&["kraken"], &ProviderSettings::default())
            .err()
            .unwrap();
        assert!(matches!(err, MarketDataError::UnknownProvider(name) if name == "kraken"));
    }

    #[test]
    fn test_tokenrate_api_requires_url() {
        assert!(build_providers(&["tokenrate-api"], &ProviderSettings::default()).is_err());

        let settings = ProviderSettings {
            tokenrate_api_url: Some("http://localhost:8000".to_string()),
            ..ProviderSettings::default()
        };
        let providers = build_providers(&["tokenrate-api"], &settings).unwrap();
        assert_eq!(providers[0].name(), "tokenrate-api");
    }
}
