/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use synergyhub_api::{app::{build_router, AppState}, config::Config};
/// use synergyhub_shared::{db::pool::{create_pool, DatabaseConfig}, store::Stores};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let app = build_router(AppState::new(Stores::postgres(pool), config));
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use synergyhub_shared::{auth::jwt, ingest::IngestService, store::Stores};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

/// Shared application state
///
/// Cloned into every handler via Axum's `State` extractor; all fields are
/// reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Persistence handles
    pub stores: Stores,

    /// Task ingestion pipeline over `stores`
    pub ingest: IngestService,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(stores: Stores, config: Config) -> Self {
        Self {
            ingest: IngestService::new(&stores),
            stores,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Identity of the caller, inserted by [`jwt_auth_layer`]
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /api
/// ├── GET  /health
/// ├── /tasks
/// │   ├── GET  /                  liveness probe
/// │   └── POST /                  ingest a task
/// ├── /auth
/// │   ├── POST /signup
/// │   ├── POST /login
/// │   └── GET  /me                (Bearer JWT)
/// └── /projects
///     ├── GET, POST /
///     ├── GET, PUT, DELETE /:id
///     └── GET  /:id/tasks[?status=]
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let task_routes = Router::new().route(
        "/",
        get(routes::tasks::tasks_probe).post(routes::tasks::create_task),
    );

    let me_route = Router::new()
        .route("/me", get(routes::auth::me))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let auth_routes = Router::new()
        .route("/signup", axum::routing::post(routes::auth::signup))
        .route("/login", axum::routing::post(routes::auth::login))
        .merge(me_route);

    let project_routes = Router::new()
        .route(
            "/",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/:id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route("/:id/tasks", get(routes::projects::list_project_tasks));

    let api_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/tasks", task_routes)
        .nest("/auth", auth_routes)
        .nest("/projects", project_routes);

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
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

    Router::new()
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

/// JWT authentication middleware layer
///
/// Validates the `Authorization: Bearer` token and inserts [`AuthUser`] into
/// the request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_token(token.trim(), state.jwt_secret())?;

    req.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
    });

    Ok(next.run(req).await)
}
