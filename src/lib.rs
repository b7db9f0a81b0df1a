//! # hellahella
//!
//! Web control panel for a hellanzb Usenet download daemon.
//!
//! The daemon itself is an external process exposing an XML-RPC interface;
//! this crate puts a login-gated HTTP API in front of it: a dashboard with
//! live status, queue management (reorder, dequeue, bandwidth cap) and
//! one-click Newzbin enqueueing via a bookmarklet.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hellahella::{Config, XmlRpcClient, api};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::default());
//!     config.validate()?;
//!
//!     let rpc = Arc::new(XmlRpcClient::new(&config.daemon)?);
//!
//!     // Serve the control panel (blocks until shutdown)
//!     api::start_api_server(rpc, config).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP API server
pub mod api;
/// Per-session polling cache for daemon status and queue
pub mod cache;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// XML-RPC client for the daemon
pub mod rpc;
/// Browser session store
pub mod session;
/// Typed views of the daemon's data structures
pub mod types;

// Re-export commonly used types
pub use cache::{CacheEntry, PollingCache};
pub use config::{AuthConfig, CacheConfig, Config, DaemonConfig, ServerConfig};
pub use error::{ApiError, Error, ErrorDetail, Result, RpcError, ToHttpStatus};
pub use rpc::{HellanzbRpc, Value, XmlRpcClient};
pub use session::{SessionManager, SessionState};
pub use types::{QueueItem, StatusSnapshot};

use std::sync::Arc;

/// Run the control panel until a termination signal arrives.
///
/// Serves the API on the configured bind address and shuts down when the
/// process receives a signal.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn run_with_shutdown(rpc: Arc<dyn HellanzbRpc>, config: Arc<Config>) -> Result<()> {
    tokio::select! {
        result = api::start_api_server(rpc, config) => result,
        () = wait_for_signal() => {
            tracing::info!("Shutting down");
            Ok(())
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
