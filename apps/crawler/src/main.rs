mod args;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokenrate_core::backfill::{parse_job_time, Backfiller, DailyJob, DateRange};
use tokenrate_core::utils::time_utils::{day_start, today_utc};
use tokenrate_market_data::{build_providers, ProviderSettings, RateProvider, ALL_PROVIDERS};
use tokenrate_storage_sqlite::open_price_store;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use args::Args;

fn init_tracing() {
    let log_format = std::env::var("TR_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

/// Requested providers, or every provider able to answer past dates.
fn select_providers(args: &Args) -> anyhow::Result<Vec<Arc<dyn RateProvider>>> {
    let settings = ProviderSettings {
        coinlib_key: args.coinlib_key.clone(),
        ..ProviderSettings::default()
    };

    let names = args.provider_names();
    if !names.is_empty() {
        return build_providers(&names, &settings).context("failed to init provider");
    }

    Ok(build_providers(ALL_PROVIDERS, &settings)?
        .into_iter()
        .filter(|p| p.capabilities().supports_historical)
        .collect())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing();

    let today = today_utc();
    let range =
        DateRange::resolve(args.from_time, args.to_time, today).context("invalid time")?;
    if args.runs_daily_job() {
        parse_job_time(&args.job_running_time)?;
    }

    let providers = select_providers(&args)?;
    let now = chrono::Utc::now();
    for provider in &providers {
        if range.from() < today && !provider.capabilities().covers(day_start(range.from()), now) {
            tracing::warn!(
                "Provider '{}' cannot answer dates as old as {}, its backfill will fail",
                provider.name(),
                range.from()
            );
        }
    }

    let store = open_price_store(&args.db_path).context("failed to init storage")?;
    tracing::info!("Database path in use: {}", args.db_path);

    let backfiller = Arc::new(
        Backfiller::new(providers, store)
            .with_pair(&args.token, &args.currency)
            .with_request_delay(Duration::from_millis(args.request_delay_ms)),
    );

    let report = backfiller
        .backfill_range(range)
        .await
        .with_context(|| {
            format!(
                "failed to get rate with time range {} to {}",
                range.from(),
                range.to()
            )
        })?;
    tracing::info!(
        "Backfill finished: {} record(s) saved for {}/{}",
        report.total(),
        backfiller.token(),
        backfiller.currency()
    );

    if !args.runs_daily_job() {
        return Ok(());
    }

    let job = DailyJob::schedule(backfiller, &args.job_running_time)?;
    tracing::info!(
        "Daily job scheduled at {} UTC, waiting for interrupt signal",
        job.run_at()
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for interrupt signal")?;
    tracing::info!("Got interrupt signal, shutting down");
    job.shutdown().await;
    Ok(())
}
