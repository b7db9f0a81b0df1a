//! Login and logout handlers.

use crate::api::AppState;
use crate::api::auth::{SessionId, constant_time_eq, redirect_with_notice};
use crate::api::routes::LoginRequest;
use crate::error::Error;
use axum::{Extension, Json, extract::State, response::Response};
use serde_json::json;

/// GET /login/login - Login form data
///
/// Reaching the form de-authenticates the session but keeps its jump
/// target, so a login that follows still lands on the originally
/// requested route.
#[utoipa::path(
    get,
    path = "/login/login",
    tag = "login",
    responses(
        (status = 200, description = "Login form descriptor")
    )
)]
pub async fn login_form(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<Json<serde_json::Value>, Error> {
    state.sessions.with_session(&session_id, |session| {
        session.authenticated = false;
    })?;

    Ok(Json(json!({
        "action": "/login/login",
        "fields": ["name", "password"],
    })))
}

/// POST /login/login - Authenticate the session
///
/// Both fields are compared in constant time. Success redirects to the
/// session's jump target when one was recorded, otherwise to the
/// dashboard; the target is consumed either way.
#[utoipa::path(
    post,
    path = "/login/login",
    tag = "login",
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Logged in, redirecting"),
        (status = 401, description = "Invalid user/password combination")
    )
)]
pub async fn login_submit(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, Error> {
    let auth = &state.config.auth;
    let name_ok = constant_time_eq(request.name.as_bytes(), auth.username.as_bytes());
    let password_ok = constant_time_eq(request.password.as_bytes(), auth.password.as_bytes());

    if !(name_ok && password_ok) {
        tracing::warn!(session_id = %session_id, "Failed login attempt");
        return Err(Error::InvalidCredentials);
    }

    let target = state.sessions.with_session(&session_id, |session| {
        session.authenticated = true;
        session.jump_target.take()
    })?;
    let target = target.unwrap_or_else(|| "/hellanzb/index".to_string());

    tracing::info!(session_id = %session_id, target = %target, "Login succeeded");
    Ok(redirect_with_notice(&target, "Logged in"))
}

/// GET /login/logout - Drop authentication and return to the login form
#[utoipa::path(
    get,
    path = "/login/logout",
    tag = "login",
    responses(
        (status = 303, description = "Logged out, redirecting to login")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<Response, Error> {
    state.sessions.with_session(&session_id, |session| {
        session.clear_auth();
    })?;

    tracing::info!(session_id = %session_id, "Logged out");
    Ok(redirect_with_notice("/login/login", "Logged out"))
}
