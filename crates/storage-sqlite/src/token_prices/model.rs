//! Database model for cached token prices.

use chrono::Utc;
use diesel::prelude::*;

use tokenrate_core::rates::PriceRecord;
use tokenrate_core::utils::time_utils::format_date;

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::token_prices)]
#[diesel(primary_key(token, currency, provider, date))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TokenPriceDB {
    pub token: String,
    pub currency: String,
    pub provider: String,
    pub date: String,
    pub price: f64,
    pub updated_at: String,
}

impl From<&PriceRecord> for TokenPriceDB {
    fn from(record: &PriceRecord) -> Self {
        Self {
            token: record.token.clone(),
            currency: record.currency.clone(),
            provider: record.provider.clone(),
            date: format_date(record.date),
            price: record.price,
            updated_at: Utc::now().to_rfc3339(),
        }
    }
}
