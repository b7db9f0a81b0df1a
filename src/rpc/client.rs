//! reqwest-based XML-RPC transport

use crate::config::DaemonConfig;
use crate::error::{Error, Result, RpcError};
use crate::rpc::{HellanzbRpc, Value, value};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use url::Url;

/// Fixed service user the daemon's htpasswd gate expects
const RPC_USER: &str = "hellanzb";

/// XML-RPC client for one hellanzb daemon
///
/// Built once from [`DaemonConfig`] and shared across all sessions; the
/// credentials are static, so no per-session client state exists. Calls
/// are not retried — a failed call propagates to the caller.
pub struct XmlRpcClient {
    http: reqwest::Client,
    endpoint: Url,
    password: String,
}

impl XmlRpcClient {
    /// Create a client for the configured daemon endpoint
    pub fn new(config: &DaemonConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint_url()).map_err(|e| Error::Config {
            message: format!("invalid daemon endpoint: {e}"),
            key: Some("daemon".to_string()),
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::ApiServerError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            password: config.password.clone(),
        })
    }

    fn map_transport_error(e: reqwest::Error) -> Error {
        if e.is_timeout() {
            RpcError::Timeout(e.to_string()).into()
        } else {
            RpcError::Connection(e.to_string()).into()
        }
    }
}

#[async_trait]
impl HellanzbRpc for XmlRpcClient {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let body = value::encode_call(method, &params);

        tracing::debug!(method, endpoint = %self.endpoint, "Calling daemon");

        let response = self
            .http
            .post(self.endpoint.clone())
            .basic_auth(RPC_USER, Some(&self.password))
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Connection(format!(
                "daemon returned HTTP {status}"
            ))
            .into());
        }

        let text = response.text().await.map_err(Self::map_transport_error)?;
        let result = value::decode_response(&text)?;

        tracing::debug!(method, "Daemon call succeeded");
        Ok(result)
    }
}
