use anyhow::Context;
use std::net::SocketAddr;
use std::time::Duration;

use tokenrate_market_data::ProviderSettings;

const DEFAULT_DB_PATH: &str = "./db/tokenrate.db";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_PROVIDERS: &[&str] = &["coingecko", "coinlib"];

/// Server configuration, read from `TR_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    /// Upper bound for a whole HTTP request, provider fallbacks included.
    pub request_timeout: Duration,
    /// Provider names in fallback order.
    pub providers: Vec<String>,
    pub coinlib_key: String,
    /// Root URL of an upstream tokenrate server, used by `tokenrate-api`.
    pub upstream_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            db_path: DEFAULT_DB_PATH.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            providers: DEFAULT_PROVIDERS.iter().map(|s| s.to_string()).collect(),
            coinlib_key: String::new(),
            upstream_url: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Blank values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let listen_addr = match get("TR_LISTEN_ADDR") {
            Some(v) => v
                .trim()
                .parse::<SocketAddr>()
                .with_context(|| format!("invalid TR_LISTEN_ADDR '{}'", v))?,
            None => defaults.listen_addr,
        };

        let request_timeout = match get("TR_REQUEST_TIMEOUT_MS") {
            Some(v) => Duration::from_millis(
                v.trim()
                    .parse::<u64>()
                    .with_context(|| format!("invalid TR_REQUEST_TIMEOUT_MS '{}'", v))?,
            ),
            None => defaults.request_timeout,
        };

        let providers = match get("TR_PROVIDERS") {
            Some(v) => {
                let names: Vec<String> = v
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if names.is_empty() {
                    anyhow::bail!("TR_PROVIDERS must name at least one provider");
                }
                names
            }
            None => defaults.providers,
        };

        Ok(Self {
            listen_addr,
            db_path: get("TR_DB_PATH").unwrap_or(defaults.db_path),
            request_timeout,
            providers,
            coinlib_key: get("COINLIB_KEY").unwrap_or_default(),
            upstream_url: get("TR_UPSTREAM_URL"),
        })
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            coinlib_key: self.coinlib_key.clone(),
            tokenrate_api_url: self.upstream_url.clone(),
            ..ProviderSettings::default()
        }
    }
}
