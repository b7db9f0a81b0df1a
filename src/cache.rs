//! Per-session polling cache for daemon status and queue
//!
//! Every page that shows status or queue data would otherwise trigger its
//! own RPC round-trips against the daemon. The cache bounds that: reads
//! within the TTL window are served from the session, and a refresh always
//! replaces status and queue together — never independently. A failed
//! refresh leaves the previous entry untouched and propagates the error.

use crate::error::Result;
use crate::rpc::HellanzbRpc;
use crate::session::SessionManager;
use crate::types::{QueueItem, StatusSnapshot};
use chrono::{DateTime, Duration, Utc};

/// One cached fetch of the daemon's status and queue
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// When the snapshot was fetched
    pub fetched_at: DateTime<Utc>,
    /// When the snapshot stops being served (`fetched_at + TTL`)
    pub expires_at: DateTime<Utc>,
    /// Status at fetch time
    pub status: StatusSnapshot,
    /// Queue contents at fetch time, in daemon order
    pub queue: Vec<QueueItem>,
}

impl CacheEntry {
    fn new(status: StatusSnapshot, queue: Vec<QueueItem>, ttl: Duration) -> Self {
        let fetched_at = Utc::now();
        Self {
            fetched_at,
            expires_at: fetched_at + ttl,
            status,
            queue,
        }
    }

    /// Whether the entry is still inside its TTL window
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}

/// Session-scoped status/queue cache with a fixed TTL
///
/// One instance is shared by all handlers; the cached data itself lives
/// inside each [`crate::session::SessionState`], so nothing is shared
/// across sessions.
#[derive(Debug, Clone, Copy)]
pub struct PollingCache {
    ttl: Duration,
}

impl PollingCache {
    /// Create a cache with the given TTL in seconds
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Return the session's status and queue, refreshing from the daemon
    /// when the cached entry is absent or expired
    pub async fn fetch(
        &self,
        sessions: &SessionManager,
        session_id: &str,
        rpc: &dyn HellanzbRpc,
    ) -> Result<(StatusSnapshot, Vec<QueueItem>)> {
        let now = Utc::now();
        let cached = sessions.with_session(session_id, |session| {
            session
                .cache
                .as_ref()
                .filter(|entry| entry.is_fresh(now))
                .map(|entry| (entry.status.clone(), entry.queue.clone()))
        })?;

        match cached {
            Some(hit) => Ok(hit),
            None => self.refresh(sessions, session_id, rpc).await,
        }
    }

    /// Unconditionally refetch status and queue and replace the entry
    ///
    /// Used after mutations whose effect must be visible within the same
    /// request/response cycle (pause/continue).
    pub async fn refresh(
        &self,
        sessions: &SessionManager,
        session_id: &str,
        rpc: &dyn HellanzbRpc,
    ) -> Result<(StatusSnapshot, Vec<QueueItem>)> {
        // Both calls must succeed before the entry is touched
        let status = rpc.status().await?;
        let queue = rpc.list().await?;

        let entry = CacheEntry::new(status.clone(), queue.clone(), self.ttl);
        sessions.with_session(session_id, |session| {
            session.cache = Some(entry);
        })?;

        tracing::debug!(session_id, queue_len = queue.len(), "Refreshed polling cache");
        Ok((status, queue))
    }

    /// Drop the session's cached entry so the next read hits the daemon
    pub fn invalidate(&self, sessions: &SessionManager, session_id: &str) -> Result<()> {
        sessions.with_session(session_id, |session| {
            session.cache = None;
        })
    }
}
