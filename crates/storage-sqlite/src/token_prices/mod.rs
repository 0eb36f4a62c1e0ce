//! Price cache storage, keyed by (token, currency, provider, date).

pub mod model;
pub mod repository;

pub use model::TokenPriceDB;
pub use repository::TokenPriceRepository;
