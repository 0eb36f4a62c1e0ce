//! Shared fakes for backfill tests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokenrate_market_data::{MarketDataError, ProviderCapabilities, RateProvider};

use crate::errors::{DatabaseError, Result};
use crate::rates::{PriceRecord, PriceStore};

pub struct FakeProvider {
    name: &'static str,
    price: f64,
    fail_on: HashSet<NaiveDate>,
    fail_always: bool,
    queried: Mutex<Vec<NaiveDate>>,
}

impl FakeProvider {
    pub fn ok(name: &'static str, price: f64) -> Arc<Self> {
        Arc::new(Self {
            name,
            price,
            fail_on: HashSet::new(),
            fail_always: false,
            queried: Mutex::new(Vec::new()),
        })
    }

    pub fn failing_on(name: &'static str, dates: &[NaiveDate]) -> Arc<Self> {
        Arc::new(Self {
            name,
            price: 0.0,
            fail_on: dates.iter().copied().collect(),
            fail_always: false,
            queried: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            price: 0.0,
            fail_on: HashSet::new(),
            fail_always: true,
            queried: Mutex::new(Vec::new()),
        })
    }

    pub fn queried(&self) -> Vec<NaiveDate> {
        self.queried.lock().unwrap().clone()
    }
}

#[async_trait]
impl RateProvider for FakeProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::full_history()
    }

    async fn rate(
        &self,
        _token: &str,
        _currency: &str,
        timestamp: DateTime<Utc>,
    ) -> std::result::Result<f64, MarketDataError> {
        let date = timestamp.date_naive();
        self.queried.lock().unwrap().push(date);
        if self.fail_always || self.fail_on.contains(&date) {
            return Err(MarketDataError::ProviderError {
                provider: self.name.to_string(),
                message: format!("no data for {}", date),
            });
        }
        Ok(self.price)
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub records: Mutex<Vec<PriceRecord>>,
    pub writes: AtomicUsize,
    pub fail_writes: bool,
}

impl FakeStore {
    pub fn saved_for(&self, provider: &str) -> Vec<NaiveDate> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.provider == provider)
            .map(|r| r.date)
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceStore for FakeStore {
    async fn save_token_price(&self, record: &PriceRecord) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(DatabaseError::QueryFailed("readonly database".to_string()).into());
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn get_token_price(
        &self,
        token: &str,
        currency: &str,
        provider: &str,
        date: NaiveDate,
    ) -> Result<f64> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| {
                r.token == token && r.currency == currency && r.provider == provider && r.date == date
            })
            .map(|r| r.price)
            .ok_or_else(|| DatabaseError::NotFound(format!("{}/{}", token, currency)).into())
    }
}

pub fn as_dyn(providers: &[Arc<FakeProvider>]) -> Vec<Arc<dyn RateProvider>> {
    providers
        .iter()
        .map(|p| p.clone() as Arc<dyn RateProvider>)
        .collect()
}
