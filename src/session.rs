//! Browser session store
//!
//! Sessions are keyed by a UUID carried in a cookie. Each session holds the
//! authentication flag, the preserved jump target for the login redirect,
//! and the per-session polling cache entry. DashMap entry locking is what
//! serializes concurrent mutation of a single session.

use crate::cache::CacheEntry;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use uuid::Uuid;

/// Per-session state
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Unique session identifier
    pub id: String,
    /// Whether this session has passed the login gate
    pub authenticated: bool,
    /// Route originally requested before a login redirect
    pub jump_target: Option<String>,
    /// Cached status/queue snapshot, if any
    pub cache: Option<CacheEntry>,
    /// Session creation time
    pub created_at: DateTime<Utc>,
    /// Last activity timestamp
    pub last_activity: DateTime<Utc>,
}

impl SessionState {
    /// Create a fresh unauthenticated session
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            authenticated: false,
            jump_target: None,
            cache: None,
            created_at: Utc::now(),
            last_activity: Utc::now(),
        }
    }

    /// Update the last activity timestamp
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Check whether the session has idled past the timeout
    pub fn is_expired(&self, timeout_minutes: u64) -> bool {
        let elapsed = Utc::now().signed_duration_since(self.last_activity);
        elapsed.num_minutes() >= timeout_minutes as i64
    }

    /// Drop authentication and everything derived from it
    ///
    /// The cache goes too: a cached snapshot must not survive into a
    /// different user's login on the same browser session.
    pub fn clear_auth(&mut self) {
        self.authenticated = false;
        self.jump_target = None;
        self.cache = None;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Concurrent session store backed by a DashMap
pub struct SessionManager {
    sessions: Arc<DashMap<String, SessionState>>,
    max_sessions: usize,
    timeout_minutes: u64,
}

impl SessionManager {
    /// Create a session manager and start its background expiry sweep
    pub fn new(max_sessions: usize, timeout_minutes: u64) -> Self {
        let manager = Self {
            sessions: Arc::new(DashMap::new()),
            max_sessions,
            timeout_minutes,
        };
        manager.start_expiry_sweep();
        manager
    }

    /// Resolve a session id from a request cookie, creating a new session
    /// when the cookie is absent, unknown, or expired
    ///
    /// Returns the session id and whether it was newly created (so the
    /// caller knows to set the cookie).
    pub fn resolve(&self, session_id: Option<&str>) -> Result<(String, bool)> {
        if let Some(id) = session_id {
            if let Some(mut session) = self.sessions.get_mut(id) {
                if !session.is_expired(self.timeout_minutes) {
                    session.touch();
                    return Ok((id.to_string(), false));
                }
            }
            // Unknown or expired id falls through to a fresh session
        }

        if self.sessions.len() >= self.max_sessions {
            return Err(Error::SessionLimit {
                active: self.sessions.len(),
                max: self.max_sessions,
            });
        }

        let session = SessionState::new();
        let id = session.id.clone();
        self.sessions.insert(id.clone(), session);

        tracing::debug!(session_id = %id, "Created new session");
        Ok((id, true))
    }

    /// Run a closure against one session's state under its entry lock
    pub fn with_session<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut SessionState) -> R,
    ) -> Result<R> {
        match self.sessions.get_mut(session_id) {
            Some(mut session) => Ok(f(&mut session)),
            None => Err(Error::NotFound(format!("session {session_id}"))),
        }
    }

    /// Whether the given session exists and has passed the login gate
    pub fn is_authenticated(&self, session_id: &str) -> bool {
        self.sessions
            .get(session_id)
            .map(|s| s.authenticated)
            .unwrap_or(false)
    }

    /// Delete a session outright
    pub fn delete(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    /// Number of live sessions
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    fn start_expiry_sweep(&self) {
        let sessions = Arc::clone(&self.sessions);
        let timeout_minutes = self.timeout_minutes;

        tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(60));

            loop {
                interval.tick().await;

                let expired: Vec<String> = sessions
                    .iter()
                    .filter(|entry| entry.value().is_expired(timeout_minutes))
                    .map(|entry| entry.key().clone())
                    .collect();

                let mut removed = 0;
                for session_id in expired {
                    if sessions.remove(&session_id).is_some() {
                        removed += 1;
                        tracing::debug!(session_id = %session_id, "Removed expired session");
                    }
                }

                if removed > 0 {
                    tracing::info!(
                        removed,
                        active = sessions.len(),
                        "Cleaned up expired sessions"
                    );
                }
            }
        });
    }
}
