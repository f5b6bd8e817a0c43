//! HTTP server implementation.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info};

use super::{create_routes, AppState};
use crate::error::{PagestatsError, Result};

/// HTTP server for the page and stats API.
pub struct HttpServer {
    /// Address to bind to
    addr: SocketAddr,
    /// State shared with the handlers
    state: AppState,
    /// Upper bound on a single request
    request_timeout: Duration,
}

impl HttpServer {
    pub fn new(addr: SocketAddr, state: AppState, request_timeout: Duration) -> Self {
        Self {
            addr,
            state,
            request_timeout,
        }
    }

    /// Bind to the configured address and serve until `signal` resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve_on(listener, signal).await
    }

    /// Serve on an already bound listener until `signal` resolves.
    pub async fn serve_on<F>(self, listener: TcpListener, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let page = self.state.page;
        let app = with_middleware(create_routes(self.state), self.request_timeout);

        info!(
            addr = %listener.local_addr()?,
            page = ?page,
            "HTTP server listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server failed");
                PagestatsError::Server(e.to_string())
            })
    }
}

/// Request tracing, and a 408 for any request running past `request_timeout`.
fn with_middleware(router: Router, request_timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                request_timeout,
            )),
    )
}
