//! Authentication middleware
//!
//! Provides the request-authorization gate: an Axum middleware for route
//! groups and an `AuthUser` extractor for handlers.
//!
//! Every rejection (missing header, wrong scheme, malformed, forged or
//! expired token) produces the same 401 body. The concrete reason is only
//! logged at debug level.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

/// Authenticated user extracted from JWT
///
/// Lives in the request extensions for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Take the token out of an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = bearer_token(headers).ok_or_else(|| {
        debug!("Rejected request without bearer token");
        ApiError::authentication_required()
    })?;

    state.auth().authorize(token)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already authenticated by `auth_middleware`
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let app_state = AppState::from_ref(state);
        authenticate(&app_state, &parts.headers)
    }
}

/// Middleware function for authentication
///
/// Apply to a group of routes with `middleware::from_fn_with_state`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, request.headers())?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers_with("Token abc")), None);
        assert_eq!(bearer_token(&headers_with("abc.def.ghi")), None);
    }

    #[test]
    fn test_empty_bearer_token_is_missing() {
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&headers_with("Bearer    ")), None);
    }

    #[test]
    fn test_auth_user_debug() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
        };
        let debug_str = format!("{:?}", user);
        assert!(debug_str.contains("AuthUser"));
    }
}
