use axum::{
    routing::{get, post},
    Router,
};

use super::{handlers, AppState};

/// Create the router with all endpoints.
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/stats", get(handlers::stats))
        .route("/api/qr", post(handlers::generate_qr))
        .with_state(state)
}
