//! tokenrate market data crate
//!
//! Provider-agnostic access to token/fiat exchange rates.
//!
//! # Overview
//!
//! Every data source implements [`RateProvider`]: given a token, a fiat
//! currency and a timestamp it either answers with a rate or fails with a
//! [`MarketDataError`]. Callers hold an ordered `Vec<Arc<dyn RateProvider>>`
//! built once at startup by [`build_providers`] and never branch on the
//! concrete type.
//!
//! ```text
//!   build_providers(["coingecko", "gemini"])
//!                  |
//!                  v
//!   +--------------------------+
//!   |  Vec<Arc<dyn Provider>>  |  (fixed order, first success wins)
//!   +--------------------------+
//!        |        |        |
//!        v        v        v
//!   CoinGecko  CoinLib  Gemini  tokenrate API
//! ```
//!
//! # Core Types
//!
//! - [`RateProvider`] - the capability every source implements
//! - [`ProviderCapabilities`] - what a source can answer (latest / historical)
//! - [`ProviderSettings`] - keys, base URLs and timeouts used by the factory
//! - [`PriceResponse`] - JSON body served by the tokenrate HTTP facade

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

pub use errors::MarketDataError;
pub use models::{PriceResponse, ETH_ID, USD_ID};
pub use provider::{
    CoinGeckoProvider, CoinLibProvider, GeminiProvider, ProviderCapabilities, RateProvider,
    TokenRateApiProvider,
};
pub use provider::validate_rate;
pub use registry::{build_providers, ProviderSettings, ALL_PROVIDERS};
