use chrono::NaiveDate;
use futures::future::join_all;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokenrate_market_data::{validate_rate, RateProvider, ETH_ID, USD_ID};

use super::backfill_errors::BackfillError;
use super::date_range::DateRange;
use crate::constants::DEFAULT_REQUEST_DELAY;
use crate::errors::{Error, Result};
use crate::rates::{PriceRecord, PriceStore};
use crate::utils::time_utils::day_start;

/// Number of records saved per provider by a successful range backfill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub saved: Vec<(String, usize)>,
}

impl BackfillReport {
    pub fn total(&self) -> usize {
        self.saved.iter().map(|(_, n)| n).sum()
    }
}

/// Fills the price store for one token/currency pair from every provider.
pub struct Backfiller {
    providers: Vec<Arc<dyn RateProvider>>,
    store: Arc<dyn PriceStore>,
    token: String,
    currency: String,
    request_delay: Duration,
}

impl Backfiller {
    pub fn new(providers: Vec<Arc<dyn RateProvider>>, store: Arc<dyn PriceStore>) -> Self {
        Self {
            providers,
            store,
            token: ETH_ID.to_string(),
            currency: USD_ID.to_string(),
            request_delay: DEFAULT_REQUEST_DELAY,
        }
    }

    pub fn with_pair(mut self, token: &str, currency: &str) -> Self {
        self.token = token.to_string();
        self.currency = currency.to_string();
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn providers(&self) -> &[Arc<dyn RateProvider>] {
        &self.providers
    }

    /// Walks `range` once per provider, concurrently.
    ///
    /// Each walk visits dates in ascending order and stops at its first
    /// failure. Other walks are never cancelled; all are joined before the
    /// outcome is reported.
    pub async fn backfill_range(&self, range: DateRange) -> Result<BackfillReport> {
        let days = Arc::new(range.days());
        info!(
            "Backfilling {}/{} from {} to {} ({} day(s)) with {} provider(s)",
            self.token,
            self.currency,
            range.from(),
            range.to(),
            days.len(),
            self.providers.len()
        );

        let handles = self.providers.iter().map(|provider| {
            let walk = ProviderWalk {
                provider: provider.clone(),
                store: self.store.clone(),
                token: self.token.clone(),
                currency: self.currency.clone(),
                delay: self.request_delay,
            };
            let days = days.clone();
            tokio::spawn(async move { walk.run(&days).await })
        });
        let results = join_all(handles).await;

        let mut report = BackfillReport::default();
        let mut failures = Vec::new();
        for (provider, joined) in self.providers.iter().zip(results) {
            let name = provider.name();
            match joined {
                Ok(Ok(saved)) => {
                    info!("Provider '{}' backfilled {} record(s)", name, saved);
                    report.saved.push((name.to_string(), saved));
                }
                Ok(Err(e)) => {
                    error!("Provider '{}' backfill aborted: {}", name, e);
                    failures.push(format!("{}: {}", name, e));
                }
                Err(e) => {
                    error!("Provider '{}' backfill task panicked: {}", name, e);
                    failures.push(format!("{}: {}", name, e));
                }
            }
        }

        match failures.first() {
            Some(first) => Err(BackfillError::Failed {
                failed: failures.len(),
                first: first.clone(),
            }
            .into()),
            None => Ok(report),
        }
    }

    /// Queries every provider once for `date` and saves what succeeds.
    ///
    /// Failures are logged and skipped. Returns the number of saved records.
    pub async fn fill_date(&self, date: NaiveDate) -> usize {
        let timestamp = day_start(date);
        let outcomes = join_all(self.providers.iter().map(|provider| async move {
            let name = provider.name();
            let answer = provider.rate(&self.token, &self.currency, timestamp).await;
            let price = match answer.and_then(|price| validate_rate(name, price)) {
                Ok(price) => price,
                Err(e) => {
                    warn!(
                        "Provider '{}' failed for {}/{} on {}: {}",
                        name, self.token, self.currency, date, e
                    );
                    return false;
                }
            };
            let record = PriceRecord::new(&self.token, &self.currency, name, date, price);
            match self.store.save_token_price(&record).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to save {} rate from '{}': {}", date, name, e);
                    false
                }
            }
        }))
        .await;

        outcomes.into_iter().filter(|saved| *saved).count()
    }
}

struct ProviderWalk {
    provider: Arc<dyn RateProvider>,
    store: Arc<dyn PriceStore>,
    token: String,
    currency: String,
    delay: Duration,
}

impl ProviderWalk {
    async fn run(&self, days: &[NaiveDate]) -> Result<usize> {
        let name = self.provider.name();
        let mut saved = 0;

        for (i, date) in days.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let price = self
                .provider
                .rate(&self.token, &self.currency, day_start(*date))
                .await
                .and_then(|price| validate_rate(name, price))
                .map_err(Error::from)?;

            let record = PriceRecord::new(&self.token, &self.currency, name, *date, price);
            self.store.save_token_price(&record).await?;
            saved += 1;
            debug!(
                "Saved {}/{} on {} from '{}': {}",
                self.token, self.currency, date, name, price
            );
        }

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backfill::test_mocks::{as_dyn, FakeProvider, FakeStore};
    use crate::errors::Error;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn jan_1_to_3() -> DateRange {
        DateRange::resolve(
            Some(date(2024, 1, 1)),
            Some(date(2024, 1, 3)),
            date(2024, 6, 1),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_each_provider_walks_every_day_in_order() {
        let a = FakeProvider::ok("a", 100.0);
        let b = FakeProvider::ok("b", 200.0);
        let store = Arc::new(FakeStore::default());
        let backfiller = Backfiller::new(as_dyn(&[a.clone(), b.clone()]), store.clone())
            .with_request_delay(Duration::ZERO);

        let report = backfiller.backfill_range(jan_1_to_3()).await.unwrap();

        let expected = vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)];
        assert_eq!(a.queried(), expected);
        assert_eq!(b.queried(), expected);
        assert_eq!(store.saved_for("a"), expected);
        assert_eq!(store.saved_for("b"), expected);
        assert_eq!(report.total(), 6);
        assert_eq!(
            report.saved,
            vec![("a".to_string(), 3), ("b".to_string(), 3)]
        );
    }

    #[tokio::test]
    async fn test_failing_walk_stops_but_siblings_finish() {
        let a = FakeProvider::ok("a", 100.0);
        let b = FakeProvider::failing_on("b", &[date(2024, 1, 2)]);
        let store = Arc::new(FakeStore::default());
        let backfiller = Backfiller::new(as_dyn(&[a.clone(), b.clone()]), store.clone())
            .with_request_delay(Duration::ZERO);

        let err = backfiller.backfill_range(jan_1_to_3()).await.unwrap_err();

        assert!(matches!(
            &err,
            Error::Backfill(BackfillError::Failed { failed: 1, first }) if first.starts_with("b: ")
        ));
        assert_eq!(a.queried().len(), 3);
        assert_eq!(store.saved_for("a").len(), 3);
        assert_eq!(b.queried(), vec![date(2024, 1, 1), date(2024, 1, 2)]);
        assert_eq!(store.saved_for("b"), vec![date(2024, 1, 1)]);
    }

    #[tokio::test]
    async fn test_save_failure_aborts_walk() {
        let a = FakeProvider::ok("a", 100.0);
        let store = Arc::new(FakeStore {
            fail_writes: true,
            ..FakeStore::default()
        });
        let backfiller =
            Backfiller::new(as_dyn(&[a.clone()]), store.clone()).with_request_delay(Duration::ZERO);

        let err = backfiller.backfill_range(jan_1_to_3()).await.unwrap_err();

        assert!(matches!(err, Error::Backfill(BackfillError::Failed { .. })));
        assert_eq!(a.queried().len(), 1);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_first_failure_follows_provider_order() {
        let a = FakeProvider::failing("a");
        let b = FakeProvider::failing("b");
        let store = Arc::new(FakeStore::default());
        let backfiller =
            Backfiller::new(as_dyn(&[a, b]), store).with_request_delay(Duration::ZERO);

        let err = backfiller.backfill_range(jan_1_to_3()).await.unwrap_err();

        assert!(matches!(
            &err,
            Error::Backfill(BackfillError::Failed { failed: 2, first }) if first.starts_with("a: ")
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_delay_between_dates() {
        let a = FakeProvider::ok("a", 1.0);
        let store = Arc::new(FakeStore::default());
        let backfiller = Backfiller::new(as_dyn(&[a.clone()]), store)
            .with_request_delay(Duration::from_millis(200));

        let started = tokio::time::Instant::now();
        backfiller.backfill_range(jan_1_to_3()).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(400));
        assert_eq!(a.queried().len(), 3);
    }

    #[tokio::test]
    async fn test_fill_date_skips_failures() {
        let a = FakeProvider::failing("a");
        let b = FakeProvider::ok("b", 2.0);
        let store = Arc::new(FakeStore::default());
        let backfiller = Backfiller::new(as_dyn(&[a.clone(), b.clone()]), store.clone())
            .with_pair("BTC", "EUR");

        let saved = backfiller.fill_date(date(2024, 3, 1)).await;

        assert_eq!(saved, 1);
        assert_eq!(a.queried(), vec![date(2024, 3, 1)]);
        assert_eq!(store.saved_for("b"), vec![date(2024, 3, 1)]);
        assert_eq!(
            store
                .get_token_price("BTC", "EUR", "b", date(2024, 3, 1))
                .unwrap(),
            2.0
        );
    }

    #[tokio::test]
    async fn test_empty_provider_list_is_a_noop() {
        let store = Arc::new(FakeStore::default());
        let backfiller = Backfiller::new(Vec::new(), store.clone());

        let report = backfiller.backfill_range(jan_1_to_3()).await.unwrap();

        assert_eq!(report.total(), 0);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_rate_aborts_walk_without_saving() {
        let a = FakeProvider::ok("a", -5.0);
        let store = Arc::new(FakeStore::default());
        let backfiller =
            Backfiller::new(as_dyn(&[a.clone()]), store.clone()).with_request_delay(Duration::ZERO);

        let err = backfiller.backfill_range(jan_1_to_3()).await.unwrap_err();

        assert!(matches!(
            &err,
            Error::Backfill(BackfillError::Failed { failed: 1, first }) if first.starts_with("a: ")
        ));
        assert_eq!(a.queried(), vec![date(2024, 1, 1)]);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_fill_date_skips_invalid_rates() {
        let a = FakeProvider::ok("a", f64::INFINITY);
        let b = FakeProvider::ok("b", 2.0);
        let store = Arc::new(FakeStore::default());
        let backfiller = Backfiller::new(as_dyn(&[a, b]), store.clone());

        let saved = backfiller.fill_date(date(2024, 3, 1)).await;

        assert_eq!(saved, 1);
        assert!(store.saved_for("a").is_empty());
        assert_eq!(store.saved_for("b"), vec![date(2024, 3, 1)]);
    }
}
