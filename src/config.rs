//! Configuration module for the clip search service.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;

use tracing::info;

use crate::presenter::TimeFormat;
use crate::search::DEFAULT_BASE_URL;

/// Service configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Twelve Labs API key
    pub api_key: String,
    /// Index all searches run against
    pub index_id: String,
    /// Twelve Labs API root
    pub api_base_url: String,
    /// URL pinged periodically to keep the deployment awake
    pub self_ping_url: Option<String>,
    /// Seconds between keep-alive pings
    pub keep_alive_interval_secs: u64,
    /// Per-ping timeout in seconds
    pub keep_alive_timeout_secs: u64,
    /// UI HTTP server port
    pub http_port: u16,
    /// Prometheus metrics HTTP port
    pub metrics_port: u16,
    /// Bind address (supports IPv4, IPv6, or dual-stack)
    pub bind_address: String,
    /// Use mock searcher instead of the Twelve Labs API (opt-in via MOCK_SEARCH)
    pub mock_search: bool,
    /// How clip start/end offsets are displayed
    pub time_format: TimeFormat,
    /// Sessions idle longer than this are dropped
    pub session_idle_secs: u64,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let api_key = if self.api_key.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("Config")
            .field("api_key", &api_key)
            .field("index_id", &self.index_id)
            .field("api_base_url", &self.api_base_url)
            .field("self_ping_url", &self.self_ping_url)
            .field("keep_alive_interval_secs", &self.keep_alive_interval_secs)
            .field("keep_alive_timeout_secs", &self.keep_alive_timeout_secs)
            .field("http_port", &self.http_port)
            .field("metrics_port", &self.metrics_port)
            .field("bind_address", &self.bind_address)
            .field("mock_search", &self.mock_search)
            .field("time_format", &self.time_format)
            .field("session_idle_secs", &self.session_idle_secs)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `API_KEY` - Twelve Labs API key (required unless MOCK_SEARCH=true)
    /// - `INDEX_ID` - Twelve Labs index id (required unless MOCK_SEARCH=true)
    /// - `API_BASE_URL` - API root (default: https://api.twelvelabs.io/v1.3)
    /// - `SELF_PING_URL` - Keep-alive target (default: unset, keep-alive disabled)
    /// - `KEEP_ALIVE_INTERVAL_SECS` - Ping interval (default: 600)
    /// - `KEEP_ALIVE_TIMEOUT_SECS` - Ping timeout (default: 10)
    /// - `HTTP_PORT` - UI listen port (default: 8501)
    /// - `METRICS_PORT` - Prometheus metrics port (default: 9090)
    /// - `BIND_ADDRESS` - Bind address (default: auto-detect [::] or 0.0.0.0)
    /// - `MOCK_SEARCH` - Use mock searcher for testing (default: false)
    /// - `TIME_FORMAT` - `minutes` or `seconds` (default: minutes)
    /// - `SESSION_IDLE_SECS` - Idle time before a session is dropped (default: 86400)
    /// - `RUST_LOG` - Log level (default: info)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mock_search = env::var("MOCK_SEARCH")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);

        let api_key = non_empty("API_KEY").unwrap_or_default();
        let index_id = non_empty("INDEX_ID").unwrap_or_default();

        if !mock_search {
            if api_key.is_empty() {
                return Err(ConfigError::MissingRequired("API_KEY"));
            }
            if index_id.is_empty() {
                return Err(ConfigError::MissingRequired("INDEX_ID"));
            }
        }

        let api_base_url =
            non_empty("API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let time_format = match non_empty("TIME_FORMAT") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid("TIME_FORMAT", v))?,
            None => TimeFormat::default(),
        };

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        // Bind address with auto-detect fallback
        let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| "auto".to_string());

        Ok(Config {
            api_key,
            index_id,
            api_base_url,
            self_ping_url: non_empty("SELF_PING_URL"),
            keep_alive_interval_secs: parse_or("KEEP_ALIVE_INTERVAL_SECS", 600u64).max(1),
            keep_alive_timeout_secs: parse_or("KEEP_ALIVE_TIMEOUT_SECS", 10u64).max(1),
            http_port: parse_or("HTTP_PORT", 8501),
            metrics_port: parse_or("METRICS_PORT", 9090),
            bind_address,
            mock_search,
            time_format,
            session_idle_secs: parse_or("SESSION_IDLE_SECS", 86_400u64).max(1),
            log_level,
        })
    }

    /// Resolve the UI bind address.
    ///
    /// `auto` tries dual-stack `[::]` first and falls back to `0.0.0.0`. A bare
    /// IPv6 address is bracketed before the port is appended.
    pub async fn http_bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let port = self.http_port;
        if self.bind_address == "auto" {
            let dual_stack = SocketAddr::from((std::net::Ipv6Addr::UNSPECIFIED, port));
            return Ok(match tokio::net::TcpListener::bind(dual_stack).await {
                Ok(_) => {
                    info!("Auto-detected dual-stack support, using [::]");
                    dual_stack
                }
                Err(_) => {
                    info!("IPv6 not available, falling back to IPv4 (0.0.0.0)");
                    SocketAddr::from((std::net::Ipv4Addr::UNSPECIFIED, port))
                }
            });
        }

        let bind_str = if self.bind_address.contains(':') && !self.bind_address.starts_with('[') {
            format!("[{}]:{}", self.bind_address, port)
        } else {
            format!("{}:{}", self.bind_address, port)
        };
        bind_str
            .parse()
            .map_err(|_| ConfigError::Invalid("BIND_ADDRESS", self.bind_address.clone()))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
