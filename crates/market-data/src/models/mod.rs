//! Shared identifiers and wire types.

use serde::{Deserialize, Serialize};

/// Token identifier for Ether.
pub const ETH_ID: &str = "ETH";

/// Currency identifier for the US dollar.
pub const USD_ID: &str = "USD";

/// JSON body returned by the tokenrate price endpoint.
///
/// Failures are reported in-band (`failed` + `error`) with HTTP 200, so
/// clients must inspect the body rather than the status code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub currency: String,
    pub failed: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    pub price: f64,
}

impl PriceResponse {
    pub fn success(token: &str, currency: &str, price: f64) -> Self {
        Self {
            token: token.to_string(),
            currency: currency.to_string(),
            failed: false,
            error: String::new(),
            price,
        }
    }

    pub fn failure(token: &str, currency: &str, error: impl ToString) -> Self {
        Self {
            token: token.to_string(),
            currency: currency.to_string(),
            failed: true,
            error: error.to_string(),
            price: 0.0,
        }
    }
}
