//! Live-view handlers: lightweight endpoints polled by the dashboard.

use crate::api::AppState;
use crate::api::auth::SessionId;
use crate::api::routes::{EnqueueRequest, EnqueueResponse, is_valid_newzbin_id};
use crate::error::Error;
use crate::types::StatusSnapshot;
use axum::{Extension, Json, extract::State};

/// GET /live/status - Current daemon status, served from the session cache
#[utoipa::path(
    get,
    path = "/live/status",
    tag = "live",
    responses(
        (status = 200, description = "Daemon status", body = StatusSnapshot),
        (status = 303, description = "Not logged in"),
        (status = 502, description = "Daemon unreachable")
    )
)]
pub async fn live_status(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<Json<StatusSnapshot>, Error> {
    let (status, _) = state
        .cache
        .fetch(&state.sessions, &session_id, state.rpc.as_ref())
        .await?;
    Ok(Json(status))
}

/// POST /live/toggle_download - Flip between paused and downloading
///
/// The direction comes from the daemon's current state: paused continues,
/// downloading pauses. The cache is force-refreshed so the returned status
/// already reflects the flip.
#[utoipa::path(
    post,
    path = "/live/toggle_download",
    tag = "live",
    responses(
        (status = 200, description = "New daemon status", body = StatusSnapshot),
        (status = 303, description = "Not logged in"),
        (status = 502, description = "Daemon unreachable")
    )
)]
pub async fn toggle_download(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<Json<StatusSnapshot>, Error> {
    let (status, _) = state
        .cache
        .fetch(&state.sessions, &session_id, state.rpc.as_ref())
        .await?;

    if status.is_paused {
        state.rpc.continue_download().await?;
    } else {
        state.rpc.pause().await?;
    }

    let (status, _) = state
        .cache
        .refresh(&state.sessions, &session_id, state.rpc.as_ref())
        .await?;

    tracing::info!(is_paused = status.is_paused, "Toggled download state");
    Ok(Json(status))
}

/// POST /live/enqueue_nzb - Enqueue a Newzbin post by id
///
/// The id is validated before any daemon traffic; a malformed id never
/// reaches the RPC layer.
#[utoipa::path(
    post,
    path = "/live/enqueue_nzb",
    tag = "live",
    request_body = EnqueueRequest,
    responses(
        (status = 200, description = "Post enqueued", body = EnqueueResponse),
        (status = 303, description = "Not logged in"),
        (status = 422, description = "Id is not 4 to 10 digits"),
        (status = 502, description = "Daemon unreachable")
    )
)]
pub async fn enqueue_nzb(
    State(state): State<AppState>,
    Json(request): Json<EnqueueRequest>,
) -> Result<Json<EnqueueResponse>, Error> {
    if !is_valid_newzbin_id(&request.newzbinid) {
        return Err(Error::Validation(format!(
            "Newzbin id must be 4 to 10 digits, got {:?}",
            request.newzbinid
        )));
    }

    state.rpc.enqueue_newzbin(&request.newzbinid).await?;

    tracing::info!(newzbin_id = %request.newzbinid, "Enqueued Newzbin post");
    Ok(Json(EnqueueResponse {
        enqueued: request.newzbinid,
    }))
}
