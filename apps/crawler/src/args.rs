use chrono::NaiveDate;
use clap::Parser;

use tokenrate_core::constants::DEFAULT_JOB_RUNNING_TIME;
use tokenrate_core::utils::time_utils::parse_date;
use tokenrate_market_data::{ETH_ID, USD_ID};

fn parse_cli_date(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).map_err(|e| e.to_string())
}

/// Token price crawler
#[derive(Parser, Debug)]
#[command(name = "tokenrate-crawler")]
#[command(about = "Crawl token prices from rate providers into the price store")]
#[command(version)]
pub struct Args {
    /// First date to crawl, YYYY-MM-DD (default: today)
    #[arg(long, env = "FROM_TIME", value_parser = parse_cli_date)]
    pub from_time: Option<NaiveDate>,

    /// Last date to crawl, YYYY-MM-DD (default: today). When set, the crawler
    /// exits after the range instead of running the daily job
    #[arg(long, env = "TO_TIME", value_parser = parse_cli_date)]
    pub to_time: Option<NaiveDate>,

    /// UTC time at which the daily job fetches yesterday's price, HH:MM:SS
    #[arg(long, env = "JOB_RUNNING_TIME", default_value = DEFAULT_JOB_RUNNING_TIME)]
    pub job_running_time: String,

    /// Providers to crawl, comma separated (default: every provider with history)
    #[arg(long, env = "PROVIDER", value_delimiter = ',')]
    pub provider: Vec<String>,

    /// SQLite database file
    #[arg(long, env = "TR_DB_PATH", default_value = "./db/tokenrate.db")]
    pub db_path: String,

    /// CoinLib API key
    #[arg(long, env = "COINLIB_KEY", default_value = "", hide_env_values = true)]
    pub coinlib_key: String,

    #[arg(long, default_value = ETH_ID)]
    pub token: String,

    #[arg(long, default_value = USD_ID)]
    pub currency: String,

    /// Pause between two dates of one provider, in milliseconds
    #[arg(long, default_value_t = 200)]
    pub request_delay_ms: u64,

    /// Exit after the range backfill
    #[arg(long)]
    pub once: bool,
}

impl Args {
    /// Whether the daily job is armed after the range backfill.
    pub fn runs_daily_job(&self) -> bool {
        !self.once && self.to_time.is_none()
    }

    /// Explicitly requested provider names, blanks removed.
    pub fn provider_names(&self) -> Vec<String> {
        self.provider
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    }
}
