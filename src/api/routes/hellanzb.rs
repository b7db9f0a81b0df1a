//! Dashboard and queue-management handlers.

use crate::api::AppState;
use crate::api::auth::SessionId;
use crate::api::routes::{
    BandwidthResponse, BookmarkletResponse, DashboardResponse, QueueResponse, SetBandwidthRequest,
    UpdateOrderRequest, UpdateOrderResponse, is_valid_newzbin_id,
};
use crate::error::Error;
use crate::types::QueueItem;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

/// GET / and /hellanzb/index - Dashboard: banner, status and queue
#[utoipa::path(
    get,
    path = "/hellanzb/index",
    tag = "hellanzb",
    responses(
        (status = 200, description = "Dashboard data", body = DashboardResponse),
        (status = 303, description = "Not logged in"),
        (status = 502, description = "Daemon unreachable")
    )
)]
pub async fn index(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<Json<DashboardResponse>, Error> {
    let (status, queue) = state
        .cache
        .fetch(&state.sessions, &session_id, state.rpc.as_ref())
        .await?;
    let asciiart = state.rpc.ascii_art().await?;

    Ok(Json(DashboardResponse {
        asciiart,
        status,
        queue,
    }))
}

/// GET /hellanzb/queue - Queue page data
#[utoipa::path(
    get,
    path = "/hellanzb/queue",
    tag = "hellanzb",
    responses(
        (status = 200, description = "Queue contents", body = QueueResponse),
        (status = 303, description = "Not logged in"),
        (status = 502, description = "Daemon unreachable")
    )
)]
pub async fn queue_page(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<Json<QueueResponse>, Error> {
    let (_, queue) = state
        .cache
        .fetch(&state.sessions, &session_id, state.rpc.as_ref())
        .await?;
    Ok(Json(QueueResponse { queue }))
}

/// GET /hellanzb/queuelist - Queue partial for in-page refreshes
#[utoipa::path(
    get,
    path = "/hellanzb/queuelist",
    tag = "hellanzb",
    responses(
        (status = 200, description = "Queue contents", body = QueueResponse),
        (status = 303, description = "Not logged in"),
        (status = 502, description = "Daemon unreachable")
    )
)]
pub async fn queue_list(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<Json<QueueResponse>, Error> {
    let (_, queue) = state
        .cache
        .fetch(&state.sessions, &session_id, state.rpc.as_ref())
        .await?;
    Ok(Json(QueueResponse { queue }))
}

/// POST /hellanzb/dequeue/{id} - Remove an NZB from the queue
///
/// Accepts either a bare daemon id or the `nzb_<id>` form the queue
/// page's DOM elements carry.
#[utoipa::path(
    post,
    path = "/hellanzb/dequeue/{id}",
    tag = "hellanzb",
    params(
        ("id" = String, Path, description = "NZB id, optionally prefixed with nzb_")
    ),
    responses(
        (status = 204, description = "NZB dequeued"),
        (status = 303, description = "Not logged in"),
        (status = 422, description = "Malformed id"),
        (status = 502, description = "Daemon unreachable")
    )
)]
pub async fn dequeue(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    Path(id): Path<String>,
) -> Result<StatusCode, Error> {
    let nzb_id = id.strip_prefix("nzb_").unwrap_or(&id);
    if nzb_id.is_empty() || !nzb_id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Validation(format!("malformed NZB id: {id}")));
    }

    state.rpc.dequeue(nzb_id).await?;
    state.cache.invalidate(&state.sessions, &session_id)?;

    tracing::info!(nzb_id, "Dequeued NZB");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /hellanzb/update_order - Apply a drag-and-drop reordering
///
/// Walks the submitted order against the cached queue and issues one
/// `move` per positional mismatch. A single-item move therefore costs a
/// single daemon call. The cache is invalidated afterwards so the next
/// read reflects the daemon's authoritative order.
#[utoipa::path(
    post,
    path = "/hellanzb/update_order",
    tag = "hellanzb",
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order applied", body = UpdateOrderResponse),
        (status = 303, description = "Not logged in"),
        (status = 502, description = "Daemon unreachable")
    )
)]
pub async fn update_order(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Json<UpdateOrderResponse>, Error> {
    let (_, queue) = state
        .cache
        .fetch(&state.sessions, &session_id, state.rpc.as_ref())
        .await?;
    let mut order: Vec<String> = queue.iter().map(QueueItem::id_string).collect();

    let mut moves = 0;
    for (index, submitted) in request.nzb.iter().enumerate() {
        if index >= order.len() {
            break;
        }
        if *submitted != order[index] {
            // The daemon's move is a 1-indexed remove-and-insert
            state.rpc.move_nzb(submitted, (index + 1) as i32).await?;
            moves += 1;

            // Mirror that remove-and-insert locally so later slots are
            // compared against the order the daemon now holds
            if let Some(from) = order.iter().position(|id| id == submitted) {
                let id = order.remove(from);
                order.insert(index, id);
            }
        }
    }

    state.cache.invalidate(&state.sessions, &session_id)?;

    tracing::info!(moves, "Applied queue reordering");
    Ok(Json(UpdateOrderResponse { moves }))
}

/// GET /hellanzb/bandwidth - Current bandwidth cap
#[utoipa::path(
    get,
    path = "/hellanzb/bandwidth",
    tag = "hellanzb",
    responses(
        (status = 200, description = "Current cap in KB/s", body = BandwidthResponse),
        (status = 303, description = "Not logged in"),
        (status = 502, description = "Daemon unreachable")
    )
)]
pub async fn get_bandwidth(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Result<Json<BandwidthResponse>, Error> {
    let (status, _) = state
        .cache
        .fetch(&state.sessions, &session_id, state.rpc.as_ref())
        .await?;
    Ok(Json(BandwidthResponse {
        maxrate: status.maxrate,
    }))
}

/// POST /hellanzb/bandwidth - Set the bandwidth cap
///
/// Invalidates the cache after the `maxrate` call and reads back a fresh
/// status so the response shows the cap the daemon actually applied.
#[utoipa::path(
    post,
    path = "/hellanzb/bandwidth",
    tag = "hellanzb",
    request_body = SetBandwidthRequest,
    responses(
        (status = 200, description = "Cap applied, fresh value returned", body = BandwidthResponse),
        (status = 303, description = "Not logged in"),
        (status = 422, description = "Negative cap"),
        (status = 502, description = "Daemon unreachable")
    )
)]
pub async fn set_bandwidth(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    Json(request): Json<SetBandwidthRequest>,
) -> Result<Json<BandwidthResponse>, Error> {
    if request.maxrate < 0 {
        return Err(Error::Validation(format!(
            "maxrate must be zero or positive, got {}",
            request.maxrate
        )));
    }

    state.rpc.max_rate(request.maxrate).await?;
    state.cache.invalidate(&state.sessions, &session_id)?;

    let (status, _) = state
        .cache
        .fetch(&state.sessions, &session_id, state.rpc.as_ref())
        .await?;

    tracing::info!(maxrate = request.maxrate, "Set bandwidth cap");
    Ok(Json(BandwidthResponse {
        maxrate: status.maxrate,
    }))
}

/// GET /queue/{url} - Bookmarklet target: enqueue a Newzbin post by URL
///
/// The wildcard tail is the page URL the bookmarklet was clicked on; the
/// post id is its last non-empty path segment. On success the browser is
/// sent back to the page it came from.
#[utoipa::path(
    get,
    path = "/queue/{url}",
    tag = "hellanzb",
    params(
        ("url" = String, Path, description = "Newzbin post URL ending in the post id")
    ),
    responses(
        (status = 303, description = "Enqueued, redirecting back"),
        (status = 422, description = "URL does not end in a valid post id"),
        (status = 502, description = "Daemon unreachable")
    )
)]
pub async fn enqueue_bookmarklet(
    State(state): State<AppState>,
    Path(url): Path<String>,
) -> Result<Response, Error> {
    let id = url
        .split('/')
        .rev()
        .find(|segment| !segment.is_empty())
        .unwrap_or("")
        .to_string();

    if !is_valid_newzbin_id(&id) {
        return Err(Error::Validation(format!(
            "URL does not end in a Newzbin post id: {url}"
        )));
    }

    state.rpc.enqueue_newzbin(&id).await?;
    tracing::info!(newzbin_id = %id, "Enqueued Newzbin post from bookmarklet");

    Ok((
        StatusCode::SEE_OTHER,
        [(header::LOCATION, url)],
        Json(json!({ "enqueued": id })),
    )
        .into_response())
}

/// GET /hellanzb/bookmarklet - Bookmarklet installation data
#[utoipa::path(
    get,
    path = "/hellanzb/bookmarklet",
    tag = "hellanzb",
    responses(
        (status = 200, description = "Bookmarklet link", body = BookmarkletResponse),
        (status = 303, description = "Not logged in")
    )
)]
pub async fn bookmarklet(headers: HeaderMap) -> Json<BookmarkletResponse> {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost:8750");
    let link = format!("http://{host}");

    Json(BookmarkletResponse {
        bookmarklet: format!("javascript:location.href='{link}/queue/'+location.href"),
        link,
    })
}
