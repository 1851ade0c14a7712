//! Common test utilities for integration tests
//!
//! Builds the full router over an in-memory user store and drives it with
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use user_accounts_backend::{
    config::{AppConfig, PasswordAlgorithm, PasswordConfig},
    repositories::{InMemoryUserStore, UserStore},
    routes,
    state::AppState,
};

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-32chars";

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application over an empty in-memory store
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryUserStore::new()))
    }

    pub fn with_store(store: Arc<dyn UserStore>) -> Self {
        let state = AppState::new(store, test_config()).expect("Failed to build app state");
        let app = routes::create_router(state.clone());
        Self { app, state }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }

    fn request(method: &str, path: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        self.send(Self::request("GET", path, None, None)).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        self.send(Self::request("POST", path, None, Some(body))).await
    }

    /// Make an authenticated GET request
    pub async fn get_auth(&self, path: &str, token: &str) -> (StatusCode, String) {
        self.send(Self::request("GET", path, Some(token), None)).await
    }

    /// Make an authenticated POST request with JSON body
    pub async fn post_auth(&self, path: &str, token: &str, body: &str) -> (StatusCode, String) {
        self.send(Self::request("POST", path, Some(token), Some(body)))
            .await
    }

    /// Make an authenticated PUT request with JSON body
    pub async fn put_auth(&self, path: &str, token: &str, body: &str) -> (StatusCode, String) {
        self.send(Self::request("PUT", path, Some(token), Some(body)))
            .await
    }

    /// Make an authenticated DELETE request
    pub async fn delete_auth(&self, path: &str, token: &str) -> (StatusCode, String) {
        self.send(Self::request("DELETE", path, Some(token), None))
            .await
    }

    /// Register a user and return the created user JSON
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Value {
        let body = json!({ "name": name, "email": email, "password": password });
        let (status, response) = self.post("/api/register", &body.to_string()).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {response}");
        serde_json::from_str::<Value>(&response).unwrap()["user"].clone()
    }

    /// Log in and return the token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let body = json!({ "email": email, "password": password });
        let (status, response) = self.post("/api/login", &body.to_string()).await;
        assert_eq!(status, StatusCode::OK, "login failed: {response}");
        let response: Value = serde_json::from_str(&response).unwrap();
        response["token"].as_str().unwrap().to_string()
    }

    /// Register a fresh user and return a token for it
    pub async fn authenticated(&self) -> String {
        let email = format!("caller_{}@example.com", uuid::Uuid::new_v4());
        self.register("Caller", &email, "secret1").await;
        self.login(&email, "secret1").await
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.jwt.secret = TEST_SECRET.to_string();
    config.password = PasswordConfig {
        algorithm: PasswordAlgorithm::Argon2,
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        bcrypt_cost: 4,
    };
    config
}

pub fn error_message(body: &str) -> String {
    let body: Value = serde_json::from_str(body).unwrap();
    body["error"]["message"].as_str().unwrap_or_default().to_string()
}
