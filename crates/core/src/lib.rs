//! tokenrate core - rate resolution and backfill orchestration.
//!
//! This crate is storage-agnostic: it defines the [`rates::PriceStore`]
//! trait that the `storage-sqlite` crate implements, and consumes providers
//! through `tokenrate_market_data::RateProvider`.
//!
//! - [`rates`] answers "what was token T worth in currency C on date D",
//!   cache-first for past dates, always live for today.
//! - [`backfill`] fills the store for a date range and keeps it current
//!   with a daily job.

pub mod backfill;
pub mod constants;
pub mod errors;
pub mod rates;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
