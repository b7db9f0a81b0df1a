//! OpenAPI documentation and schema generation
//!
//! Compile-time OpenAPI spec for the control panel API, generated with
//! utoipa.

use utoipa::OpenApi;

/// OpenAPI documentation for the hellahella control panel API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI (when enabled in the config)
#[derive(OpenApi)]
#[openapi(
    info(
        title = "hellahella API",
        version = "0.2.0",
        description = "Web control panel for a hellanzb download daemon: login-gated dashboard, queue management and live status over the daemon's XML-RPC interface",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8750", description = "Local control panel")
    ),
    paths(
        // Dashboard and queue
        crate::api::routes::index,
        crate::api::routes::queue_page,
        crate::api::routes::queue_list,
        crate::api::routes::dequeue,
        crate::api::routes::update_order,
        crate::api::routes::get_bandwidth,
        crate::api::routes::set_bandwidth,
        crate::api::routes::bookmarklet,
        crate::api::routes::enqueue_bookmarklet,

        // Live views
        crate::api::routes::live_status,
        crate::api::routes::toggle_download,
        crate::api::routes::enqueue_nzb,

        // Login
        crate::api::routes::login_form,
        crate::api::routes::login_submit,
        crate::api::routes::logout,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        // Daemon data types
        crate::types::StatusSnapshot,
        crate::types::QueueItem,

        // API request/response types
        crate::api::routes::DashboardResponse,
        crate::api::routes::QueueResponse,
        crate::api::routes::UpdateOrderRequest,
        crate::api::routes::UpdateOrderResponse,
        crate::api::routes::SetBandwidthRequest,
        crate::api::routes::BandwidthResponse,
        crate::api::routes::EnqueueRequest,
        crate::api::routes::EnqueueResponse,
        crate::api::routes::LoginRequest,
        crate::api::routes::BookmarkletResponse,

        // Error types
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "hellanzb", description = "Dashboard and queue management - reorder, dequeue, bandwidth, bookmarklet"),
        (name = "live", description = "Live views polled by the dashboard - status, pause toggle, enqueue"),
        (name = "login", description = "Session login and logout"),
        (name = "system", description = "System endpoints - health check, OpenAPI spec"),
    )
)]
pub struct ApiDoc;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_doc_generation() {
        // Test that the OpenAPI spec can be generated without panicking
        let _spec = ApiDoc::openapi();
    }

    #[test]
    fn test_openapi_spec_has_paths() {
        let spec = ApiDoc::openapi();
        assert!(
            !spec.paths.paths.is_empty(),
            "OpenAPI spec should have paths defined"
        );
        assert!(spec.paths.paths.contains_key("/hellanzb/update_order"));
        assert!(spec.paths.paths.contains_key("/live/enqueue_nzb"));
        assert!(spec.paths.paths.contains_key("/login/login"));
    }

    #[test]
    fn test_openapi_spec_has_components() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("spec should have components");
        assert!(components.schemas.contains_key("StatusSnapshot"));
        assert!(components.schemas.contains_key("QueueItem"));
        assert!(components.schemas.contains_key("ApiError"));
    }

    #[test]
    fn test_openapi_spec_has_tags() {
        let spec = ApiDoc::openapi();
        let tags = spec.tags.expect("spec should have tags");
        let tag_names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert!(tag_names.contains(&"hellanzb"));
        assert!(tag_names.contains(&"live"));
        assert!(tag_names.contains(&"login"));
        assert!(tag_names.contains(&"system"));
    }

    #[test]
    fn test_openapi_json_serialization() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string(&spec).expect("Should serialize to JSON");
        let _value: serde_json::Value =
            serde_json::from_str(&json).expect("Generated JSON should be valid");
    }
}
