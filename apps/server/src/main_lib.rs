use std::sync::Arc;
use std::time::Duration;

use tokenrate_core::rates::{RateService, RateServiceTrait};
use tokenrate_market_data::build_providers;
use tokenrate_storage_sqlite::open_price_store;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub rate_service: Arc<dyn RateServiceTrait>,
    /// Budget for resolving a single price request.
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(rate_service: Arc<dyn RateServiceTrait>, request_timeout: Duration) -> Self {
        Self {
            rate_service,
            request_timeout,
        }
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("TR_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let store = open_price_store(&config.db_path)?;
    tracing::info!("Database path in use: {}", config.db_path);

    let providers = build_providers(&config.providers, &config.provider_settings())?;
    let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
    tracing::info!("Rate providers in fallback order: {}", names.join(", "));

    let rate_service = Arc::new(RateService::new(providers, store));
    Ok(Arc::new(AppState::new(rate_service, config.request_timeout)))
}
