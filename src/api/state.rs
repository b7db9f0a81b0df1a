//! Application state for the API server

use crate::cache::PollingCache;
use crate::config::Config;
use crate::rpc::HellanzbRpc;
use crate::session::SessionManager;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clones) and provides
/// access to the daemon RPC client, the session store and the polling cache.
#[derive(Clone)]
pub struct AppState {
    /// RPC client for the daemon, shared across all sessions
    pub rpc: Arc<dyn HellanzbRpc>,

    /// Browser session store
    pub sessions: Arc<SessionManager>,

    /// Per-session status/queue cache
    pub cache: PollingCache,

    /// Static configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState from a configured RPC client
    pub fn new(rpc: Arc<dyn HellanzbRpc>, config: Arc<Config>) -> Self {
        let sessions = Arc::new(SessionManager::new(
            config.server.max_sessions,
            config.server.session_timeout_minutes,
        ));
        let cache = PollingCache::new(config.cache.ttl_secs);

        Self {
            rpc,
            sessions,
            cache,
            config,
        }
    }
}
