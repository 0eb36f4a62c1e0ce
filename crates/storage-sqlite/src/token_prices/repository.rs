use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::result::Error as DieselError;
use diesel::SqliteConnection;
use std::sync::Arc;

use tokenrate_core::errors::DatabaseError;
use tokenrate_core::rates::{PriceRecord, PriceStore};
use tokenrate_core::utils::time_utils::format_date;
use tokenrate_core::Result;

use super::model::TokenPriceDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::token_prices;

/// SQLite-backed [`PriceStore`].
///
/// Reads go through the pool; writes are serialised through the writer actor.
#[derive(Clone)]
pub struct TokenPriceRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl TokenPriceRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl PriceStore for TokenPriceRepository {
    async fn save_token_price(&self, record: &PriceRecord) -> Result<()> {
        let row = TokenPriceDB::from(record);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::replace_into(token_prices::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    fn get_token_price(
        &self,
        token: &str,
        currency: &str,
        provider: &str,
        date: NaiveDate,
    ) -> Result<f64> {
        let mut conn = get_connection(&self.pool)?;
        let date_str = format_date(date);

        token_prices::table
            .find((token, currency, provider, date_str.as_str()))
            .select(token_prices::price)
            .first::<f64>(&mut conn)
            .map_err(|e| match e {
                DieselError::NotFound => DatabaseError::NotFound(format!(
                    "{}/{} from {} on {}",
                    token, currency, provider, date_str
                ))
                .into(),
                other => StorageError::from(other).into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, init, run_migrations, spawn_writer};
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn create_test_repository() -> (TokenPriceRepository, tempfile::TempDir) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_path = init(&db_path.to_string_lossy()).expect("Failed to init database");

        let pool = create_pool(&db_path).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());

        (TokenPriceRepository::new(pool, writer), temp_dir)
    }

    #[tokio::test]
    async fn test_save_then_get() {
        let (repo, _dir) = create_test_repository().await;
        let record = PriceRecord::new("ETH", "USD", "coingecko", date(2019, 10, 11), 180.25);

        repo.save_token_price(&record).await.unwrap();

        let price = repo
            .get_token_price("ETH", "USD", "coingecko", date(2019, 10, 11))
            .unwrap();
        assert_eq!(price, 180.25);
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let (repo, _dir) = create_test_repository().await;
        repo.save_token_price(&PriceRecord::new("ETH", "USD", "coingecko", date(2019, 10, 11), 1.0))
            .await
            .unwrap();

        let err = repo
            .get_token_price("ETH", "USD", "gemini", date(2019, 10, 11))
            .unwrap_err();
        assert!(err.is_not_found());

        let err = repo
            .get_token_price("ETH", "USD", "coingecko", date(2019, 10, 12))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_save_is_an_upsert() {
        let (repo, _dir) = create_test_repository().await;
        let day = date(2024, 1, 1);

        repo.save_token_price(&PriceRecord::new("ETH", "USD", "gemini", day, 100.0))
            .await
            .unwrap();
        repo.save_token_price(&PriceRecord::new("ETH", "USD", "gemini", day, 101.5))
            .await
            .unwrap();

        assert_eq!(
            repo.get_token_price("ETH", "USD", "gemini", day).unwrap(),
            101.5
        );

        let mut conn = get_connection(&repo.pool).unwrap();
        let rows: i64 = token_prices::table.count().get_result(&mut conn).unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_zero_price_is_a_stored_value() {
        let (repo, _dir) = create_test_repository().await;
        let day = date(2024, 1, 1);

        repo.save_token_price(&PriceRecord::new("ETH", "USD", "gemini", day, 0.0))
            .await
            .unwrap();

        assert_eq!(repo.get_token_price("ETH", "USD", "gemini", day).unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_pairs_and_providers_are_kept_apart() {
        let (repo, _dir) = create_test_repository().await;
        let day = date(2024, 1, 2);
        for (token, provider, price) in [
            ("ETH", "gemini", 3.0),
            ("ETH", "coingecko", 2.0),
            ("BTC", "gemini", 9.0),
        ] {
            repo.save_token_price(&PriceRecord::new(token, "USD", provider, day, price))
                .await
                .unwrap();
        }

        assert_eq!(repo.get_token_price("ETH", "USD", "gemini", day).unwrap(), 3.0);
        assert_eq!(repo.get_token_price("ETH", "USD", "coingecko", day).unwrap(), 2.0);
        assert_eq!(repo.get_token_price("BTC", "USD", "gemini", day).unwrap(), 9.0);
        assert!(repo
            .get_token_price("ETH", "EUR", "gemini", day)
            .unwrap_err()
            .is_not_found());
    }
}
