//! XML-RPC client for the hellanzb daemon
//!
//! The daemon is an opaque external service; everything the control panel
//! knows about it goes through [`HellanzbRpc`]. The trait seam exists so
//! handlers can be exercised against an in-process mock daemon in tests.

use crate::error::{Result, RpcError};
use crate::types::{QueueItem, StatusSnapshot};
use async_trait::async_trait;

pub mod client;
pub mod value;

pub use client::XmlRpcClient;
pub use value::Value;

/// The daemon's RPC surface
///
/// `call` is the raw escape hatch; the named wrappers carry the method
/// names and argument conventions of the daemon contract. `move` is
/// 1-indexed and means "remove, then insert at position".
#[async_trait]
pub trait HellanzbRpc: Send + Sync {
    /// Invoke a named remote procedure with the given parameters
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value>;

    /// Fetch the daemon's status snapshot
    async fn status(&self) -> Result<StatusSnapshot> {
        let value = self.call("status", vec![]).await?;
        StatusSnapshot::from_value(value)
    }

    /// Fetch the ordered download queue
    async fn list(&self) -> Result<Vec<QueueItem>> {
        let value = self.call("list", vec![]).await?;
        QueueItem::list_from_value(value)
    }

    /// Pause downloading
    async fn pause(&self) -> Result<()> {
        self.call("pause", vec![]).await.map(|_| ())
    }

    /// Resume downloading
    async fn continue_download(&self) -> Result<()> {
        self.call("continue", vec![]).await.map(|_| ())
    }

    /// Move the NZB with the given id to `position` (1-indexed)
    async fn move_nzb(&self, id: &str, position: i32) -> Result<()> {
        self.call(
            "move",
            vec![Value::String(id.to_string()), Value::Int(position)],
        )
        .await
        .map(|_| ())
    }

    /// Remove the NZB with the given id from the queue
    async fn dequeue(&self, id: &str) -> Result<()> {
        self.call("dequeue", vec![Value::String(id.to_string())])
            .await
            .map(|_| ())
    }

    /// Set the bandwidth cap in KB/s; zero means unlimited
    async fn max_rate(&self, kbps: i32) -> Result<()> {
        self.call("maxrate", vec![Value::Int(kbps)])
            .await
            .map(|_| ())
    }

    /// Fetch and enqueue the NZB with the given Newzbin id
    async fn enqueue_newzbin(&self, id: &str) -> Result<()> {
        self.call("enqueuenewzbin", vec![Value::String(id.to_string())])
            .await
            .map(|_| ())
    }

    /// Fetch the daemon's ASCII art banner
    async fn ascii_art(&self) -> Result<String> {
        match self.call("asciiart", vec![]).await? {
            Value::String(banner) => Ok(banner),
            other => Err(RpcError::Malformed(format!(
                "asciiart: expected a string, got {other:?}"
            ))
            .into()),
        }
    }
}
