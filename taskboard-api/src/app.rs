/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::AppState, config::Config};
/// use taskboard_shared::cache::Cache;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, Cache::disabled(), config);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use taskboard_shared::auth::{jwt, middleware::AuthContext};
use taskboard_shared::cache::Cache;
use taskboard_shared::services::{projects::ProjectService, tasks::TaskService};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// All members are cheap handle clones.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Advisory cache handle
    pub cache: Cache,

    /// Project service
    pub projects: ProjectService,

    /// Task service
    pub tasks: TaskService,

    /// Application configuration
    pub config: Arc<Config>,

    /// Process start time, reported as uptime by /health
    pub started_at: Instant,
}

impl AppState {
    /// Creates new application state
    ///
    /// The services are constructed here, once, with the shared pool and
    /// cache handles injected.
    pub fn new(db: PgPool, cache: Cache, config: Config) -> Self {
        Self {
            projects: ProjectService::new(db.clone(), cache.clone()),
            tasks: TaskService::new(db.clone(), cache.clone()),
            db,
            cache,
            config: Arc::new(config),
            started_at: Instant::now(),
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
/// ├── /health                                    # Health check (public)
/// └── /api/
///     ├── /auth/
///     │   ├── POST /register                     # Public
///     │   ├── POST /login                        # Public
///     │   ├── POST /refresh                      # Refresh cookie
///     │   ├── POST /logout                       # Authenticated
///     │   └── GET  /me                           # Authenticated
///     ├── /projects/                             # Authenticated + rate limit
///     │   ├── GET / POST /
///     │   ├── GET / PUT / DELETE /:id
///     │   ├── GET / POST /:projectId/tasks
///     │   ├── GET /:projectId/tasks/stats
///     │   └── GET / PUT / DELETE /:projectId/tasks/:taskId
///     └── /tasks/
///         └── GET /all                           # Authenticated + rate limit
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first): security headers, CORS, request
/// tracing, then per-route authentication and rate limiting.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes reachable without an access token
    let auth_public = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Auth routes that require a valid access token
    let auth_protected = Router::new()
        .route("/logout", post(routes::auth::logout))
        .route("/me", get(routes::auth::me))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Project routes, including nested task routes (authenticated + rate limited)
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
        .route(
            "/:project_id/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/:project_id/tasks/stats", get(routes::tasks::task_stats))
        .route(
            "/:project_id/tasks/:task_id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::rate_limit::rate_limit_layer,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Cross-project task listing
    let task_routes = Router::new()
        .route("/all", get(routes::tasks::list_all_tasks))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::rate_limit::rate_limit_layer,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_public.merge(auth_protected))
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
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
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::COOKIE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

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

/// JWT authentication middleware layer
///
/// Accepts the access token from the Authorization header (`Bearer ...`)
/// or the httpOnly `token` cookie, validates it, then injects AuthContext
/// into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = match bearer {
        Some(header) => header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?
            .to_string(),
        None => jar
            .get("token")
            .map(|cookie| cookie.value().to_string())
            .ok_or_else(|| ApiError::Unauthorized("Not authorized, no token".to_string()))?,
    };

    let claims = jwt::validate_access_token(&token, state.jwt_secret())?;

    let auth_context = AuthContext::from_claims(claims.sub);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
