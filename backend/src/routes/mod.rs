//! Route definitions for the User Accounts API
//!
//! This module organizes all API routes and applies middleware.

use crate::auth::auth_middleware;
use crate::state::AppState;
use axum::{
    http::{header, Method},
    middleware,
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod auth;
mod health;
mod users;


pub use auth::auth_routes;
pub use users::user_routes;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config().server.request_timeout_secs);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(health::metrics))
        .nest("/api", api_routes(state.clone()))
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API routes: public auth endpoints plus the protected user resource
fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/users", users::user_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/", get(|| async { "User Accounts API" }))
        .merge(auth::auth_routes())
        .merge(protected)
}
