//! HTTP server for the page and its stats API.

mod error;
mod handlers;
mod pages;
mod routes;
mod server;

use std::sync::Arc;

use crate::config::PageKind;
use crate::stats::CounterStore;

pub use error::{ApiError, ErrorResponse};
pub use handlers::{HealthResponse, QrRequest, QrResponse};
pub use routes::create_routes;
pub use server::HttpServer;

/// Shared state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Page view counters, one store per process
    pub store: Arc<CounterStore>,

    /// Page served at `/`
    pub page: PageKind,
}

impl AppState {
    pub fn new(store: Arc<CounterStore>, page: PageKind) -> Self {
        Self { store, page }
    }
}
