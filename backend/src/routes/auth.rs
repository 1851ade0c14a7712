//! Authentication routes
//!
//! Provides the public registration and login endpoints.
//!
//! # Performance Optimizations
//!
//! - Uses pre-computed JWT keys from AppState (no per-request allocation)
//! - Password hashing runs on blocking thread pool (doesn't block async runtime)

use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use user_accounts_shared::types::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Register a new user
///
/// POST /api/register
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(req) = payload?;
    let user = state.auth().register(&req).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

/// Login with email and password
///
/// POST /api/login
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    let response = state.auth().login(&req).await?;
    Ok(Json(response))
}
