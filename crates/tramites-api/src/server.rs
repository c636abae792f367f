//! HTTP server configuration and request routing.
//!
//! Requests flow through middleware in order:
//! 1. Request ID propagation
//! 2. Request/response tracing
//! 3. Timeout enforcement
//! 4. Identity gate (request routes only)
//! 5. Handler execution
//!
//! # Graceful Shutdown
//!
//! The server stops accepting connections on SIGINT or SIGTERM and lets
//! in-flight requests finish before returning.

use std::{net::SocketAddr, time::Duration};

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info};
use uuid::Uuid;

use crate::{handlers, middleware::auth::require_user, AppState};

/// Creates the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use sqlx::PgPool;
/// use tramites_api::server::create_router;
///
/// async fn start(db: PgPool) {
///     let app = create_router(db, Duration::from_secs(30));
///     // Serve the app...
/// }
/// ```
pub fn create_router(db: PgPool, request_timeout: Duration) -> Router {
    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/live", get(handlers::liveness_check));

    let api_routes = Router::new()
        .route("/me", get(handlers::whoami))
        .route("/requests", get(handlers::list_requests).post(handlers::create_request))
        .route("/requests/{id}", get(handlers::get_request))
        .route("/requests/{id}/approve", post(handlers::approve_request))
        .route("/requests/{id}/reject", post(handlers::reject_request))
        .route_layer(middleware::from_fn(require_user));

    Router::new()
        .merge(health_routes)
        .merge(api_routes)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(attach_request_id))
        .with_state(AppState::new(db))
}

/// Response header carrying the request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Echoes a caller-supplied `x-request-id`, or generates one, on every
/// response.
async fn attach_request_id(req: Request, next: Next) -> Response {
    let request_id = match req.headers().get(REQUEST_ID_HEADER) {
        Some(supplied) if !supplied.is_empty() => Some(supplied.clone()),
        _ => HeaderValue::from_str(&Uuid::new_v4().to_string()).ok(),
    };

    let mut response = next.run(req).await;
    if let Some(request_id) = request_id {
        response.headers_mut().insert(REQUEST_ID_HEADER, request_id);
    }

    response
}

/// Starts the HTTP server with graceful shutdown support.
///
/// # Errors
///
/// Returns `std::io::Error` if the port is already in use or the network
/// interface is unavailable.
pub async fn start_server(
    db: PgPool,
    addr: SocketAddr,
    request_timeout: Duration,
) -> Result<(), std::io::Error> {
    let app = create_router(db, request_timeout);

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("HTTP server listening on {}", actual_addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Resolves on the first SIGINT or SIGTERM.
async fn shutdown_signal() {
    let signal = tokio::select! {
        () = interrupt() => "SIGINT",
        () = terminate() => "SIGTERM",
    };

    info!(signal, "shutdown requested, draining in-flight requests");
}

async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "cannot listen for SIGINT");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        },
        Err(e) => {
            error!(error = %e, "cannot listen for SIGTERM");
            std::future::pending::<()>().await;
        },
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
