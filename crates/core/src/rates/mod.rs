//! Rate resolution - domain models, services, and traits.

mod rate_service;
mod rates_errors;
mod rates_model;
mod rates_traits;

pub use rate_service::RateService;
pub use rates_errors::RateError;
pub use rates_model::PriceRecord;
pub use rates_traits::{PriceStore, RateServiceTrait};
