/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Router construction
/// - Signup/login helpers
/// - Request helpers driving the router via tower

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use sqlx::PgPool;
use taskforge_api::app::{build_router, AppState};
use taskforge_api::config::Config;
use tower::ServiceExt as _;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
}

impl TestContext {
    /// Creates a new test context with a fresh, truncated database
    ///
    /// Requires `DATABASE_URL` to point at a disposable PostgreSQL
    /// database. `JWT_SECRET` falls back to a test value when unset.
    pub async fn new() -> anyhow::Result<Self> {
        if std::env::var("JWT_SECRET").is_err() {
            std::env::set_var("JWT_SECRET", "integration-test-secret-0123456789abcdef");
        }

        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to this crate's Cargo.toml)
        sqlx::migrate!("../taskforge-shared/migrations").run(&db).await?;

        // Start from a clean slate
        sqlx::query(
            "TRUNCATE task_labels, tasks, labels, task_statuses, users RESTART IDENTITY CASCADE",
        )
        .execute(&db)
        .await?;

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Ok(Self { db, app })
    }

    /// Sends a request through the router and returns status, headers, and
    /// parsed JSON body (or Null for empty/non-JSON bodies)
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, HeaderMap, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

        (status, headers, json)
    }

    /// Sends a request and returns the raw body as a string
    pub async fn request_text(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);

        let request = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                builder.body(Body::from(json.to_string())).unwrap()
            }
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    /// Creates a user through the public signup endpoint and logs them in,
    /// returning the bearer token
    pub async fn signup_and_login(&self, email: &str, password: &str) -> String {
        let (status, _, _) = self
            .request(
                "POST",
                "/api/users",
                None,
                Some(serde_json::json!({
                    "email": email,
                    "password": password,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup should succeed");

        self.login(email, password).await
    }

    /// Logs in and returns the bearer token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, token) = self
            .request_text(
                "POST",
                "/api/login",
                Some(serde_json::json!({
                    "username": email,
                    "password": password,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login should succeed");
        assert!(!token.is_empty());

        token
    }

    /// Creates a task status and returns its id
    pub async fn create_status(&self, token: &str, name: &str, slug: &str) -> i64 {
        let (status, _, body) = self
            .request(
                "POST",
                "/api/task_statuses",
                Some(token),
                Some(serde_json::json!({ "name": name, "slug": slug })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "status create should succeed");

        body["id"].as_i64().unwrap()
    }

    /// Creates a label and returns its id
    pub async fn create_label(&self, token: &str, name: &str) -> i64 {
        let (status, _, body) = self
            .request(
                "POST",
                "/api/labels",
                Some(token),
                Some(serde_json::json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "label create should succeed");

        body["id"].as_i64().unwrap()
    }

    /// Creates a task from a JSON payload and returns its id
    pub async fn create_task(&self, token: &str, payload: serde_json::Value) -> i64 {
        let (status, _, body) = self
            .request("POST", "/api/tasks", Some(token), Some(payload))
            .await;
        assert_eq!(status, StatusCode::CREATED, "task create should succeed");

        body["id"].as_i64().unwrap()
    }
}
