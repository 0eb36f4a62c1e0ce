use std::sync::Arc;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokenrate_core::utils::time_utils::{parse_date_or, today_utc};
use tokenrate_market_data::PriceResponse;

use crate::main_lib::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PriceQuery {
    /// `YYYY-MM-DD`, today when absent.
    pub date: Option<String>,
}

/// Splits `eth-usd` into (`ETH`, `USD`).
fn parse_pair(pair: &str) -> Result<(String, String), String> {
    match pair.split_once('-') {
        Some((token, currency)) if !token.is_empty() && !currency.is_empty() => {
            Ok((token.to_ascii_uppercase(), currency.to_ascii_uppercase()))
        }
        _ => Err(format!(
            "invalid pair '{}', expected {{token}}-{{currency}}",
            pair
        )),
    }
}

async fn resolve(
    state: &AppState,
    token: &str,
    currency: &str,
    date: Option<&str>,
) -> Result<f64, String> {
    let date = parse_date_or(date, today_utc()).map_err(|e| e.to_string())?;
    let lookup = state.rate_service.historical_rate(token, currency, date);

    match tokio::time::timeout(state.request_timeout, lookup).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(_) => Err(format!(
            "get {}/{} rate for {} timed out after {}ms",
            token,
            currency,
            date,
            state.request_timeout.as_millis()
        )),
    }
}

/// Rate of a pair at a date. Failures, including malformed paths and query
/// strings, are reported in the body, always with HTTP 200.
async fn get_price(
    State(state): State<Arc<AppState>>,
    pair: Result<Path<String>, PathRejection>,
    query: Result<Query<PriceQuery>, QueryRejection>,
) -> Json<PriceResponse> {
    let (token, currency) = match pair
        .map_err(|e| e.body_text())
        .and_then(|Path(pair)| parse_pair(&pair))
    {
        Ok(pair) => pair,
        Err(e) => return Json(PriceResponse::failure("", "", e)),
    };

    let query = match query {
        Ok(Query(query)) => query,
        Err(e) => {
            tracing::warn!("Rejected query for {}/{}: {}", token, currency, e);
            return Json(PriceResponse::failure(&token, &currency, e.body_text()));
        }
    };

    match resolve(&state, &token, &currency, query.date.as_deref()).await {
        Ok(price) => Json(PriceResponse::success(&token, &currency, price)),
        Err(e) => {
            tracing::warn!("Price request for {}/{} failed: {}", token, currency, e);
            Json(PriceResponse::failure(&token, &currency, e))
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/price/{pair}", get(get_price))
}
