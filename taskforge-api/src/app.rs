/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskforge_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskforge_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskforge_shared::auth::{
    jwt,
    middleware::{extract_bearer_token, AuthContext},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// └── /api/
///     ├── POST /login               # Login (public)
///     ├── /users                    # GET list, POST signup (POST public)
///     ├── /users/:id                # GET / PUT / DELETE (owner-only mutation)
///     ├── /task_statuses[/:id]      # Full CRUD (authenticated)
///     ├── /labels[/:id]             # Full CRUD (authenticated)
///     └── /tasks[/:id]              # Full CRUD + filtered listing (authenticated)
/// ```
///
/// # Authentication
///
/// A router-level middleware validates the bearer token whenever an
/// Authorization header is present and injects `AuthContext` into request
/// extensions; a request with an invalid token is rejected outright.
/// Handlers that require a principal declare an `AuthContext` argument,
/// whose extractor responds 401 when no context was injected — so
/// `POST /api/login` and `POST /api/users` stay public simply by not
/// asking for one.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let api_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route(
            "/users",
            get(routes::users::index).post(routes::users::create),
        )
        .route(
            "/users/:id",
            get(routes::users::show)
                .put(routes::users::update)
                .delete(routes::users::delete),
        )
        .route(
            "/task_statuses",
            get(routes::task_statuses::index).post(routes::task_statuses::create),
        )
        .route(
            "/task_statuses/:id",
            get(routes::task_statuses::show)
                .put(routes::task_statuses::update)
                .delete(routes::task_statuses::delete),
        )
        .route(
            "/labels",
            get(routes::labels::index).post(routes::labels::create),
        )
        .route(
            "/labels/:id",
            get(routes::labels::show)
                .put(routes::labels::update)
                .delete(routes::labels::delete),
        )
        .route(
            "/tasks",
            get(routes::tasks::index).post(routes::tasks::create),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::show)
                .put(routes::tasks::update)
                .delete(routes::tasks::delete),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_context_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Bearer-token middleware
///
/// When an Authorization header is present, validates the token and injects
/// `AuthContext` into request extensions; an invalid token fails the
/// request with 401. Requests without the header pass through so public
/// handlers keep working — protected handlers reject them through the
/// `AuthContext` extractor.
async fn auth_context_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    if req.headers().contains_key(axum::http::header::AUTHORIZATION) {
        let token = extract_bearer_token(req.headers())?;
        let claims = jwt::validate_token(token, state.jwt_secret())?;

        let auth_context = AuthContext::from_claims(&claims);
        req.extensions_mut().insert(auth_context);
    }

    Ok(next.run(req).await)
}
