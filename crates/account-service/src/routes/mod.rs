//! Route table and application state.
//!
//! Three routers merge into the app: unauthenticated account entry
//! points plus the operational probes, the metrics scrape endpoint with
//! the recorder handle as its state, and the authenticated account
//! surface behind the auth middleware. Global layers wrap the merged
//! router so tracing, timeouts, and request metrics see every response.

use crate::config::Config;
use crate::handlers;
use crate::middleware::{http_metrics_middleware, require_auth, AuthState};
use crate::services::MediaClient;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use crate::observability::metrics::init_metrics_recorder;

/// Body limit for the three multipart endpoints that accept image
/// uploads. JSON endpoints keep the framework default.
const MAX_UPLOAD_BODY_BYTES: usize = 16 * 1024 * 1024;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Postgres pool, cloned per request by the State extractor.
    pub pool: PgPool,

    /// Immutable service configuration.
    pub config: Config,

    /// Client for the media upload service.
    pub media: MediaClient,
}

/// Build the application router.
///
/// Public surface: `/health`, `/ready`, `/metrics`, and the three
/// session entry points (`register`, `login`, `refresh-token`) under
/// `/api/v1/accounts`. Everything else under `/api/v1` requires a valid
/// access token: `logout`, `current`, `change-password`, `details`,
/// `avatar`, `cover-image`, `watch-history`, and
/// `/api/v1/channels/{username}`.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = Arc::new(AuthState {
        pool: state.pool.clone(),
        config: state.config.clone(),
    });

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route(
            "/api/v1/accounts/register",
            post(handlers::register).layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        .route("/api/v1/accounts/login", post(handlers::login))
        .route(
            "/api/v1/accounts/refresh-token",
            post(handlers::refresh_token),
        )
        .with_state(state.clone());

    // The scrape endpoint's state is the recorder handle itself
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let protected_routes = Router::new()
        .route("/api/v1/accounts/logout", post(handlers::logout))
        .route("/api/v1/accounts/current", get(handlers::current_account))
        .route(
            "/api/v1/accounts/change-password",
            post(handlers::change_password),
        )
        .route("/api/v1/accounts/details", patch(handlers::update_details))
        .route(
            "/api/v1/accounts/avatar",
            patch(handlers::update_avatar).layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        .route(
            "/api/v1/accounts/cover-image",
            patch(handlers::update_cover_image)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        .route(
            "/api/v1/accounts/watch-history",
            get(handlers::watch_history),
        )
        .route("/api/v1/channels/:username", get(handlers::channel_profile))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            require_auth,
        ))
        .with_state(state);

    // Layer order, bottom-to-top execution: timeout innermost, then
    // trace, then metrics outermost so framework-level rejections
    // (404, 405, 413) are still counted
    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn(http_metrics_middleware))
}
