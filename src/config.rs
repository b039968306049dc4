//! Gateway Configuration
//!
//! Settings are read from environment variables and may be overridden by
//! command-line flags (`--port`, `--backend`). Every value has a default so
//! the gateway starts with no configuration at all.

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_BACKEND_ADDR: &str = "127.0.0.1:31007";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5_000);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
    #[error("missing value for flag {0}")]
    MissingFlagValue(String),
}

/// Settings for the outbound RPC connection.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    /// `host:port` or full `http(s)://` URI of the backend's gRPC listener.
    pub addr: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Space the backend should search and create in. Empty means the default space.
    pub space_id: String,
    /// Object type key passed on create. Empty lets the backend pick its default type.
    pub object_type_key: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_BACKEND_ADDR.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            space_id: String::new(),
            object_type_key: String::new(),
        }
    }
}

impl BackendConfig {
    /// Endpoint URI with scheme and without trailing slash.
    pub fn endpoint_url(&self) -> String {
        let trimmed = self.addr.trim();
        let normalized = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("http://{}", trimmed)
        };

        normalized.trim_end_matches('/').to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub backend: BackendConfig,
    /// When false, backend failures are surfaced as HTTP 500 instead of
    /// being served from the fallback store.
    pub fallback_enabled: bool,
    pub log_level: tracing::Level,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            backend: BackendConfig::default(),
            fallback_enabled: true,
            log_level: tracing::Level::INFO,
        }
    }
}

impl GatewayConfig {
    /// Reads the process environment and command line.
    pub fn load() -> Result<Self, ConfigError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut config = Self::from_lookup(|name| std::env::var(name).ok())?;
        config.apply_args(&args)?;
        Ok(config)
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = parse_value("PORT", &port)?;
        }
        if let Some(addr) = lookup("BACKEND_ADDR") {
            config.backend.addr = addr;
        }
        if let Some(ms) = lookup("BACKEND_CONNECT_TIMEOUT_MS") {
            config.backend.connect_timeout =
                Duration::from_millis(parse_value("BACKEND_CONNECT_TIMEOUT_MS", &ms)?);
        }
        if let Some(ms) = lookup("BACKEND_REQUEST_TIMEOUT_MS") {
            config.backend.request_timeout =
                Duration::from_millis(parse_value("BACKEND_REQUEST_TIMEOUT_MS", &ms)?);
        }
        if let Some(space_id) = lookup("BACKEND_SPACE_ID") {
            config.backend.space_id = space_id;
        }
        if let Some(type_key) = lookup("OBJECT_TYPE_KEY") {
            config.backend.object_type_key = type_key;
        }
        if let Some(flag) = lookup("GATEWAY_FALLBACK") {
            config.fallback_enabled = parse_bool("GATEWAY_FALLBACK", &flag)?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            config.log_level = parse_value("LOG_LEVEL", &level)?;
        }

        Ok(config)
    }

    /// Applies `--port <port>` and `--backend <addr>` overrides. Unknown
    /// arguments are ignored.
    pub fn apply_args(&mut self, args: &[String]) -> Result<(), ConfigError> {
        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--port" => {
                    let value = flag_value(args, i)?;
                    self.port = parse_value("--port", value)?;
                    i += 2;
                }
                "--backend" => {
                    self.backend.addr = flag_value(args, i)?.to_string();
                    i += 2;
                }
                _ => {
                    i += 1;
                }
            }
        }
        Ok(())
    }

    /// Resolves `HOST` (an IP literal or a host name) to the first matching
    /// socket address.
    pub async fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            name: "HOST".to_string(),
            value: self.host.clone(),
            reason,
        };

        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| invalid(e.to_string()))?
            .next()
            .ok_or_else(|| invalid("host name resolved to no addresses".to_string()))
    }
}

fn flag_value<'a>(args: &'a [String], i: usize) -> Result<&'a str, ConfigError> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| ConfigError::MissingFlagValue(args[i].clone()))
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        name: name.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
