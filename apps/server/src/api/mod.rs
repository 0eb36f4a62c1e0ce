use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::main_lib::AppState;

pub mod health;
pub mod price;

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(price::router())
        .nest("/api/v1", health::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
