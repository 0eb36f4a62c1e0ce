//! Error types for rate providers.

use thiserror::Error;

/// Errors that can occur while querying a single rate provider.
///
/// A provider error is always recoverable from the caller's point of view:
/// the resolver moves on to the next provider in its list. Only the
/// exhaustion of the whole list is terminal, and that is reported by the
/// core crate, not here.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider answered, but not with something usable.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider cannot perform this kind of query at all
    /// (e.g. historical rates from a latest-only source).
    #[error("Operation not supported: {operation} by {provider}")]
    NotSupported {
        operation: String,
        provider: String,
    },

    /// The requested timestamp lies outside what the provider can answer.
    /// Providers must fail with this instead of returning an approximate value.
    #[error("Timestamp out of range for {provider}: {message}")]
    OutOfRange { provider: String, message: String },

    /// The response body could not be decoded or was missing the rate.
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// A provider name that the factory does not know about.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    pub(crate) fn provider(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_response(provider: &str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Returns true when the provider rejected the timestamp itself rather
    /// than failing to answer for it.
    pub fn is_unanswerable_timestamp(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::NotSupported { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = MarketDataError::ProviderError {
            provider: "coingecko".to_string(),
            message: "unexpected status 500".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Provider error: coingecko - unexpected status 500"
        );

        let error = MarketDataError::UnknownProvider("kraken".to_string());
        assert_eq!(error.to_string(), "Unknown provider: kraken");
    }

    #[test]
    fn test_unanswerable_timestamp_classification() {
        let error = MarketDataError::OutOfRange {
            provider: "gemini".to_string(),
            message: "older than 7 days".to_string(),
        };
        assert!(error.is_unanswerable_timestamp());

        let error = MarketDataError::NotSupported {
            operation: "historical rate".to_string(),
            provider: "coinlib".to_string(),
        };
        assert!(error.is_unanswerable_timestamp());

        let error = MarketDataError::provider("coingecko", "boom");
        assert!(!error.is_unanswerable_timestamp());
    }
}
