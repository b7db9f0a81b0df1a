//! HTTP API server module
//!
//! The control panel's web surface: a login-gated JSON API mirroring the
//! classic hellanzb front-end's URL space, backed by the daemon's XML-RPC
//! interface.

use crate::config::Config;
use crate::error::Result;
use crate::rpc::HellanzbRpc;
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Dashboard and queue (login required)
/// - `GET /` and `GET /hellanzb/index` - Dashboard: banner, status, queue
/// - `GET /hellanzb/queue` - Queue page data
/// - `GET /hellanzb/queuelist` - Queue partial for in-page refreshes
/// - `POST /hellanzb/dequeue/:id` - Remove an NZB from the queue
/// - `POST /hellanzb/update_order` - Apply a drag-and-drop reordering
/// - `GET /hellanzb/bandwidth` - Current bandwidth cap
/// - `POST /hellanzb/bandwidth` - Set the bandwidth cap
/// - `GET /hellanzb/bookmarklet` - Bookmarklet installation data
/// - `GET /queue/*url` - Bookmarklet target: enqueue a Newzbin post
///
/// ## Live views (login required)
/// - `GET /live/status` - Cached daemon status
/// - `POST /live/toggle_download` - Flip between paused and downloading
/// - `POST /live/enqueue_nzb` - Enqueue a Newzbin post by id
///
/// ## Login
/// - `GET /login/login` - Login form data (de-authenticates the session)
/// - `POST /login/login` - Authenticate
/// - `GET /login/logout` - Log out (login required)
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI (if enabled)
pub fn create_router(state: AppState) -> Router {
    // Everything behind the login gate
    let protected = Router::new()
        .route("/", get(routes::index))
        .route("/hellanzb/index", get(routes::index))
        .route("/hellanzb/queue", get(routes::queue_page))
        .route("/hellanzb/queuelist", get(routes::queue_list))
        .route("/hellanzb/dequeue/:id", post(routes::dequeue))
        .route("/hellanzb/update_order", post(routes::update_order))
        .route(
            "/hellanzb/bandwidth",
            get(routes::get_bandwidth).post(routes::set_bandwidth),
        )
        .route("/hellanzb/bookmarklet", get(routes::bookmarklet))
        .route("/queue/*url", get(routes::enqueue_bookmarklet))
        .route("/live/status", get(routes::live_status))
        .route("/live/toggle_download", post(routes::toggle_download))
        .route("/live/enqueue_nzb", post(routes::enqueue_nzb))
        .route("/login/logout", get(routes::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_login,
        ));

    // Login and system routes stay reachable without authentication
    let public = Router::new()
        .route(
            "/login/login",
            get(routes::login_form).post(routes::login_submit),
        )
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    let router = protected.merge(public);

    // Merge Swagger UI routes if enabled in config (before applying state)
    let router = if state.config.server.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    // Session resolution wraps everything, including the login routes
    let router = router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::session_middleware,
        ))
        .with_state(state.clone());

    // Apply CORS middleware if enabled in config
    if state.config.server.cors_enabled {
        let cors = build_cors_layer(&state.config.server.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// Supports "*" for any origin; otherwise allows the listed origins with
/// all methods and headers.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Builds the application state from the given RPC client and config,
/// binds a TCP listener and serves until shutdown.
pub async fn start_api_server(rpc: Arc<dyn HellanzbRpc>, config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.bind_address;
    let state = AppState::new(rpc, config);
    let app = create_router(state);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "Control panel listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("Control panel stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
