pub mod config;
pub mod error;
pub mod pipeline;
pub mod routes;
pub mod source;
pub mod state;
pub mod types;

use axum::Router;

use crate::state::AppState;

/// Every API router, ready for `with_state`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::rankings::router())
        .merge(routes::sync::router())
        .merge(routes::athletes::router())
}
