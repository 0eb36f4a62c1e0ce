use chrono::NaiveDate;

/// A persisted rate, unique by (token, currency, provider, date).
///
/// Records are written with upsert semantics: saving the same key again
/// replaces the price.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub token: String,
    pub currency: String,
    pub provider: String,
    pub date: NaiveDate,
    pub price: f64,
}

impl PriceRecord {
    pub fn new(token: &str, currency: &str, provider: &str, date: NaiveDate, price: f64) -> Self {
        Self {
            token: token.to_string(),
            currency: currency.to_string(),
            provider: provider.to_string(),
            date,
            price,
        }
    }
}
