//! Typed views of the daemon's status and queue structures

use crate::error::{Result, RpcError};
use crate::rpc::Value;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One snapshot of the daemon's `status` RPC result
///
/// The daemon reports more keys than the control panel consumes; everything
/// not modeled here is preserved in `extra` so responses stay lossless.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct StatusSnapshot {
    /// Whether downloading is currently paused
    #[serde(default)]
    pub is_paused: bool,

    /// Current download rate in KB/s (zero while paused)
    #[serde(default)]
    pub rate: f64,

    /// Configured bandwidth cap in KB/s, zero meaning unlimited
    #[serde(default)]
    pub maxrate: f64,

    /// Total size of the queue in megabytes
    #[serde(default)]
    pub queued_mb: i64,

    /// Estimated seconds until the queue drains at the current rate
    #[serde(default)]
    pub eta: i64,

    /// Percent complete of the item currently downloading
    #[serde(default)]
    pub percent_complete: i64,

    /// Daemon uptime, as the daemon formats it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<String>,

    /// Daemon version string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Unmodeled daemon-reported keys (currently_downloading, log_entries, ...)
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StatusSnapshot {
    /// Decode a `status` RPC result
    pub fn from_value(value: Value) -> Result<Self> {
        let json: serde_json::Value = value.into();
        serde_json::from_value(json)
            .map_err(|e| RpcError::Malformed(format!("status struct: {e}")).into())
    }
}

/// One entry of the daemon's `list` RPC result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueueItem {
    /// Daemon-assigned NZB id
    pub id: i64,

    /// Archive name of the queued NZB
    #[serde(rename = "nzbName", default)]
    pub nzb_name: String,

    /// Whether this entry is a PAR recovery download
    #[serde(rename = "is_par_recovery", default)]
    pub is_par_recovery: bool,

    /// Total size in megabytes, absent while the daemon is still counting
    #[serde(rename = "total_mb", default, skip_serializing_if = "Option::is_none")]
    pub total_mb: Option<i64>,

    /// Newzbin message id, if the NZB came from Newzbin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub msgid: Option<serde_json::Value>,

    /// Unmodeled daemon-reported keys (rarPassword, ...)
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl QueueItem {
    /// Decode a `list` RPC result into an ordered queue
    pub fn list_from_value(value: Value) -> Result<Vec<Self>> {
        let json: serde_json::Value = value.into();
        serde_json::from_value(json)
            .map_err(|e| RpcError::Malformed(format!("queue list: {e}")).into())
    }

    /// The id as submitted by reorder forms (string-comparable)
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }
}
