//! HTTP adapters - REST API implementations.
//!
//! The payments module owns the API surface; [`api_router`] assembles it
//! with the ambient middleware stack (tracing, request ids, CORS, timeout)
//! and the health probe.

pub mod payments;

use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use payments::{payments_router, AuthenticatedCustomer, PaymentsAppState};

/// Assemble the full API router with middleware.
///
/// `cors_origins` restricts browsers to the named origins; an empty list
/// leaves CORS open, which only development should do.
pub fn api_router(
    state: PaymentsAppState,
    cors_origins: &[String],
    request_timeout: Duration,
) -> Router {
    let cors = if cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any)
    };

    Router::new()
        .nest("/api", payments_router())
        .route("/health", get(health))
        .with_state(state)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(TimeoutLayer::new(request_timeout))
}

async fn health() -> &'static str {
    "ok"
}
