//! Common test utilities for HTTP integration tests
//!
//! Builds the full router over an in-memory store so tests exercise routing,
//! extractors, error mapping and the services without a database.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use synergyhub_api::{
    app::{build_router, AppState},
    config::Config,
};
use synergyhub_shared::store::{memory::MemoryStore, Stores};
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Router plus handles to its backing store
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
    pub backend: Arc<MemoryStore>,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgresql://unused/test".to_string()),
            "JWT_SECRET" => Some(TEST_JWT_SECRET.to_string()),
            _ => None,
        })
        .expect("test config should load");

        let backend = Arc::new(MemoryStore::new());
        let state = AppState::new(Stores::from_backend(backend.clone()), config);
        let app = build_router(state.clone());

        Self {
            app,
            state,
            backend,
        }
    }

    /// Sends a request and returns the status and parsed JSON body
    ///
    /// The body is `Value::Null` when the response has no JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    /// Sends a prebuilt request
    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body), None).await
    }

    /// Signs up a user and returns the login token
    pub async fn signup_and_login(&self, username: &str, email: &str, password: &str) -> String {
        let (status, _) = self
            .post(
                "/api/auth/signup",
                serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": password,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .post(
                "/api/auth/login",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().expect("token in login response").to_string()
    }

    /// Creates a project through the API and returns its id
    pub async fn create_project(&self, name: &str) -> String {
        let (status, body) = self
            .post("/api/projects", serde_json::json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().expect("project id").to_string()
    }
}
