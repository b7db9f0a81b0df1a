//! Configuration types for hellahella

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use utoipa::ToSchema;

/// Connection parameters for the hellanzb daemon's XML-RPC endpoint
///
/// The daemon authenticates RPC calls with HTTP Basic auth using the fixed
/// service user `hellanzb` and the configured password.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DaemonConfig {
    /// Daemon hostname or IP address (default: "localhost")
    #[serde(default = "default_daemon_host")]
    pub host: String,

    /// Daemon XML-RPC port (default: 8760)
    #[serde(default = "default_daemon_port")]
    pub port: u16,

    /// Daemon XML-RPC path (default: "/")
    #[serde(default = "default_daemon_path")]
    pub path: String,

    /// Daemon RPC password (default: "changeme")
    #[serde(default = "default_daemon_password")]
    pub password: String,

    /// RPC transport timeout in seconds (default: 30)
    #[serde(default = "default_daemon_timeout_secs")]
    pub timeout_secs: u64,
}

impl DaemonConfig {
    /// Full HTTP URL of the daemon's XML-RPC endpoint
    pub fn endpoint_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: default_daemon_host(),
            port: default_daemon_port(),
            path: default_daemon_path(),
            password: default_daemon_password(),
            timeout_secs: default_daemon_timeout_secs(),
        }
    }
}

/// Web login credentials
///
/// A single static username/password pair gates every route except the
/// login handler itself. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthConfig {
    /// Login username (default: "joe")
    #[serde(default = "default_auth_username")]
    pub username: String,

    /// Login password (default: "honker")
    #[serde(default = "default_auth_password")]
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: default_auth_username(),
            password: default_auth_password(),
        }
    }
}

/// Web server configuration (bind address, CORS, sessions)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to (default: 127.0.0.1:8750)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS middleware (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins, "*" for any (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Serve interactive Swagger UI at /swagger-ui (default: false)
    #[serde(default)]
    pub swagger_ui: bool,

    /// Idle minutes after which a browser session expires (default: 60)
    #[serde(default = "default_session_timeout_minutes")]
    pub session_timeout_minutes: u64,

    /// Maximum number of concurrent browser sessions (default: 256)
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: false,
            session_timeout_minutes: default_session_timeout_minutes(),
            max_sessions: default_max_sessions(),
        }
    }
}

/// Polling cache configuration
///
/// Status and queue reads within the TTL window are served from the
/// per-session cache instead of hitting the daemon.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CacheConfig {
    /// Cache time-to-live in seconds (default: 4)
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Main configuration for hellahella
///
/// Fields are organized into logical sub-configs:
/// - [`daemon`](DaemonConfig) — XML-RPC endpoint and credentials
/// - [`auth`](AuthConfig) — web login credentials
/// - [`server`](ServerConfig) — bind address, CORS, sessions
/// - [`cache`](CacheConfig) — polling cache TTL
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Daemon connection parameters
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Web login credentials
    #[serde(default)]
    pub auth: AuthConfig,

    /// Web server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Polling cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Validate the configuration, returning the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.daemon.host.is_empty() {
            return Err(Error::Config {
                message: "daemon host must not be empty".to_string(),
                key: Some("daemon.host".to_string()),
            });
        }
        if !self.daemon.path.starts_with('/') {
            return Err(Error::Config {
                message: "daemon path must start with '/'".to_string(),
                key: Some("daemon.path".to_string()),
            });
        }
        if self.daemon.timeout_secs == 0 {
            return Err(Error::Config {
                message: "daemon timeout must be at least 1 second".to_string(),
                key: Some("daemon.timeout_secs".to_string()),
            });
        }
        if self.auth.username.is_empty() || self.auth.password.is_empty() {
            return Err(Error::Config {
                message: "login credentials must not be empty".to_string(),
                key: Some("auth".to_string()),
            });
        }
        if self.server.max_sessions == 0 {
            return Err(Error::Config {
                message: "max_sessions must be at least 1".to_string(),
                key: Some("server.max_sessions".to_string()),
            });
        }
        Ok(())
    }
}

fn default_daemon_host() -> String {
    "localhost".to_string()
}

fn default_daemon_port() -> u16 {
    8760
}

fn default_daemon_path() -> String {
    "/".to_string()
}

fn default_daemon_password() -> String {
    "changeme".to_string()
}

fn default_daemon_timeout_secs() -> u64 {
    30
}

fn default_auth_username() -> String {
    "joe".to_string()
}

fn default_auth_password() -> String {
    "honker".to_string()
}

fn default_bind_address() -> SocketAddr {
    // Safe: static string parses
    "127.0.0.1:8750".parse().unwrap_or_else(|_| {
        SocketAddr::from(([127, 0, 0, 1], 8750))
    })
}

fn default_true() -> bool {
    true
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_session_timeout_minutes() -> u64 {
    60
}

fn default_max_sessions() -> usize {
    256
}

fn default_cache_ttl_secs() -> u64 {
    4
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();

        assert_eq!(config.daemon.port, 8760);
        assert_eq!(config.daemon.path, "/");
        assert_eq!(config.cache.ttl_secs, 4);
        assert_eq!(config.auth.username, "joe");
    }

    #[test]
    fn test_endpoint_url() {
        let daemon = DaemonConfig {
            host: "192.168.2.2".to_string(),
            ..Default::default()
        };
        assert_eq!(daemon.endpoint_url(), "http://192.168.2.2:8760/");
    }

    #[test]
    fn test_empty_host_rejected() {
        let mut config = Config::default();
        config.daemon.host.clear();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn test_bad_path_rejected() {
        let mut config = Config::default();
        config.daemon.path = "rpc".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let mut config = Config::default();
        config.auth.password.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_partial_fields() {
        let config: Config = serde_json::from_str(
            r#"{ "daemon": { "host": "nzb.lan", "password": "hunter2" } }"#,
        )
        .unwrap();

        assert_eq!(config.daemon.host, "nzb.lan");
        assert_eq!(config.daemon.port, 8760);
        assert_eq!(config.server.session_timeout_minutes, 60);
    }
}
