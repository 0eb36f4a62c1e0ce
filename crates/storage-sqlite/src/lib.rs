//! SQLite storage implementation for tokenrate.
//!
//! This crate is the only place where Diesel dependencies exist. It
//! implements [`tokenrate_core::rates::PriceStore`] on top of:
//! - an r2d2 connection pool for reads
//! - embedded Diesel migrations
//! - a single writer actor that serialises every write
//!
//! ```text
//!   core (RateService, Backfiller)
//!                  |
//!                  v  PriceStore
//!          storage-sqlite (this crate)
//!                  |
//!                  v
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod token_prices;

pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};
pub use errors::StorageError;
pub use token_prices::TokenPriceRepository;

use std::sync::Arc;
use tokenrate_core::Result;

/// Opens (and migrates) the database at `db_path` and returns a ready store.
///
/// Must be called from within a Tokio runtime, since it spawns the writer.
pub fn open_price_store(db_path: &str) -> Result<Arc<TokenPriceRepository>> {
    let db_path = init(db_path)?;
    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());
    Ok(Arc::new(TokenPriceRepository::new(pool, writer)))
}
