//! Session and login-gate middleware
//!
//! Two layers cooperate here:
//! - `session_middleware` resolves (or creates) the browser session from
//!   the session cookie and stashes the id in request extensions.
//! - `require_login` guards protected routes: unauthenticated requests get
//!   their original route recorded as the session's jump target and a
//!   303 redirect to the login handler.

use crate::api::AppState;
use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "hellahella_session";

/// Session id of the current request, inserted by [`session_middleware`]
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

/// Resolve the browser session for every request
///
/// A new session gets a `Set-Cookie` on the way out. Session-store
/// capacity errors surface as the usual JSON error response.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_id = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_session_cookie);

    let (session_id, created) = match state.sessions.resolve(cookie_id.as_deref()) {
        Ok(resolved) => resolved,
        Err(e) => return e.into_response(),
    };

    request
        .extensions_mut()
        .insert(SessionId(session_id.clone()));

    let mut response = next.run(request).await;

    if created {
        let cookie = format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

/// Gate protecting every route except login/logout and health
///
/// Records the originally requested route as the session's jump target so
/// a successful login can return the user there.
pub async fn require_login(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(SessionId(session_id)) = request.extensions().get::<SessionId>().cloned() else {
        return crate::error::Error::AuthenticationRequired.into_response();
    };

    if state.sessions.is_authenticated(&session_id) {
        return next.run(request).await;
    }

    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    tracing::debug!(session_id = %session_id, target = %target, "Unauthenticated access, redirecting to login");

    if let Err(e) = state.sessions.with_session(&session_id, |session| {
        session.jump_target = Some(target);
    }) {
        // The expiry sweep can remove the session between resolution and
        // here; the user just logs in without a jump back
        tracing::warn!(error = %e, session_id = %session_id, "Could not record jump target");
    }

    redirect_with_notice("/login/login", "Please log in")
}

/// Extract the session cookie value from a `Cookie` header
fn parse_session_cookie(header: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// 303 See Other with a JSON notice body
pub fn redirect_with_notice(location: &str, notice: &str) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, location.to_string())],
        Json(json!({ "notice": notice })),
    )
        .into_response()
}

/// Constant-time byte comparison for credential checks.
/// Always compares all bytes regardless of where the first mismatch occurs.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_cookie() {
        assert_eq!(
            parse_session_cookie("hellahella_session=abc-123"),
            Some("abc-123".to_string())
        );
        assert_eq!(
            parse_session_cookie("other=x; hellahella_session=abc; theme=dark"),
            Some("abc".to_string())
        );
        assert_eq!(parse_session_cookie("other=x"), None);
        assert_eq!(parse_session_cookie(""), None);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"honker", b"honker"));
        assert!(!constant_time_eq(b"honker", b"honkep"));
        assert!(!constant_time_eq(b"honker", b"honk"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_redirect_with_notice_shape() {
        let response = redirect_with_notice("/login/login", "Please log in");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login/login"
        );
    }
}
