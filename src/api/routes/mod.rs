//! Route handlers for the control panel API
//!
//! Handlers are organized by controller, mirroring the panel's URL space:
//! - [`hellanzb`] — dashboard, queue, reorder, bandwidth, bookmarklet
//! - [`live`] — AJAX-style partials: status, toggle, enqueue
//! - [`login`] — login/logout
//! - [`system`] — health, OpenAPI

use crate::types::{QueueItem, StatusSnapshot};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

mod hellanzb;
mod live;
mod login;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use hellanzb::*;
pub use live::*;
pub use login::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Response for GET / and GET /hellanzb/index
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    /// The daemon's ASCII art banner
    pub asciiart: String,
    /// Current daemon status (cached)
    pub status: StatusSnapshot,
    /// Current queue contents (cached)
    pub queue: Vec<QueueItem>,
}

/// Response for the queue views
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct QueueResponse {
    /// Current queue contents (cached)
    pub queue: Vec<QueueItem>,
}

/// Request body for POST /hellanzb/update_order
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdateOrderRequest {
    /// Ordered NZB ids as the user arranged them
    pub nzb: Vec<String>,
}

/// Response for POST /hellanzb/update_order
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UpdateOrderResponse {
    /// Number of `move` calls issued against the daemon
    pub moves: usize,
}

/// Request body for POST /hellanzb/bandwidth
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SetBandwidthRequest {
    /// Bandwidth cap in KB/s; zero means unlimited
    pub maxrate: i32,
}

/// Response for the bandwidth views
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BandwidthResponse {
    /// Bandwidth cap in KB/s; zero means unlimited
    pub maxrate: f64,
}

/// Request body for POST /live/enqueue_nzb
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct EnqueueRequest {
    /// Newzbin post id (4 to 10 digits)
    pub newzbinid: String,
}

/// Response for a successful enqueue
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EnqueueResponse {
    /// The Newzbin id that was enqueued
    pub enqueued: String,
}

/// Request body for POST /login/login
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Login username
    pub name: String,
    /// Login password
    pub password: String,
}

/// Response for GET /hellanzb/bookmarklet
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BookmarkletResponse {
    /// Base link of this control panel
    pub link: String,
    /// Bookmarklet javascript for one-click enqueueing
    pub bookmarklet: String,
}

/// Validate a Newzbin post id: strictly 4 to 10 digits
pub(crate) fn is_valid_newzbin_id(id: &str) -> bool {
    static NEWZBIN_ID: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    let pattern = NEWZBIN_ID.get_or_init(|| {
        Regex::new(r"^[0-9]{4,10}$").expect("static pattern compiles")
    });
    pattern.is_match(id)
}

#[cfg(test)]
mod validation_tests {
    use super::is_valid_newzbin_id;

    #[test]
    fn test_newzbin_id_bounds() {
        assert!(!is_valid_newzbin_id("123"));
        assert!(is_valid_newzbin_id("1234"));
        assert!(is_valid_newzbin_id("1234567890"));
        assert!(!is_valid_newzbin_id("12345678901"));
        assert!(!is_valid_newzbin_id(""));
        assert!(!is_valid_newzbin_id("12a4"));
        assert!(!is_valid_newzbin_id(" 1234"));
    }
}
