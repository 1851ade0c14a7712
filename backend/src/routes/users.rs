//! User management routes
//!
//! Every route here sits behind `auth_middleware`.

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use tracing::debug;
use user_accounts_shared::types::{
    MessageResponse, RegisterRequest, UpdateUserRequest, UserResponse,
};
use uuid::Uuid;

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

fn parse_user_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid user ID".to_string()))
}

/// POST /api/users
async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let Json(req) = payload?;
    debug!(caller = %caller.user_id, "Creating user");
    let user = state.users().create(&req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users
async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserResponse>>> {
    Ok(Json(state.users().list().await?))
}

/// GET /api/users/:id
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let id = parse_user_id(&id)?;
    Ok(Json(state.users().get(id).await?))
}

/// PUT /api/users/:id
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    let id = parse_user_id(&id)?;
    let Json(req) = payload?;
    Ok(Json(state.users().update(id, req).await?))
}

/// DELETE /api/users/:id
async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_user_id(&id)?;
    state.users().delete(id).await?;
    debug!(caller = %caller.user_id, deleted = %id, "User removed");

    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_user_id(&id.to_string()).unwrap(), id);

        match parse_user_id("12345").unwrap_err() {
            ApiError::Validation(msg) => assert_eq!(msg, "Invalid user ID"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
