// crates/wiki-relay-mcp/src/config.rs
// ============================================================================
// Module: Wiki Relay Configuration
// Description: Configuration loading and validation for the MCP server.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: wiki-relay-client, wiki-relay-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size limits. The
//! credential fallback chain is resolved once at load time: an explicit
//! `backend.api_token` wins, otherwise the `WIKI_RELAY_API_TOKEN` environment
//! value is merged in. Missing or invalid configuration fails closed.
//! Security posture: config inputs are untrusted; the resolved token never
//! appears in debug output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use wiki_relay_client::WikiClientConfig;
use wiki_relay_core::ApiToken;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "wiki-relay.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "WIKI_RELAY_CONFIG";
/// Environment variable holding the fallback API token.
pub const API_TOKEN_ENV_VAR: &str = "WIKI_RELAY_API_TOKEN";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum total config path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Returns the default maximum request body size.
const fn default_max_body_bytes() -> usize {
    1024 * 1024
}

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Top-level Wiki Relay configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WikiRelayConfig {
    /// Inbound server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Backend wiki configuration.
    pub backend: BackendConfig,
}

impl WikiRelayConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The environment fallback for the API token is applied here, once,
    /// rather than per call.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        if config.backend.api_token.is_none()
            && let Ok(raw) = env::var(API_TOKEN_ENV_VAR)
        {
            config.backend.api_token = ApiToken::new(raw);
        }
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.backend
            .client
            .validate()
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        Ok(())
    }
}

/// Backend wiki configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// HTTP client settings for the wiki REST API.
    #[serde(flatten)]
    pub client: WikiClientConfig,
    /// Process-wide API token; call-scoped tokens take precedence.
    #[serde(default)]
    pub api_token: Option<ApiToken>,
}

/// Inbound server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Transport type for MCP.
    #[serde(default)]
    pub transport: ServerTransport,
    /// Bind address for the HTTP transport.
    #[serde(default)]
    pub bind: Option<String>,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            bind: None,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Validates server transport configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        match self.transport {
            ServerTransport::Http => {
                let bind = self.bind.as_deref().unwrap_or_default().trim();
                if bind.is_empty() {
                    return Err(ConfigError::Invalid(
                        "http transport requires bind address".to_string(),
                    ));
                }
                let addr: SocketAddr = bind
                    .parse()
                    .map_err(|_| ConfigError::Invalid("invalid bind address".to_string()))?;
                if !addr.ip().is_loopback() {
                    return Err(ConfigError::Invalid(
                        "non-loopback bind disallowed; the http transport is local-only"
                            .to_string(),
                    ));
                }
            }
            ServerTransport::Stdio => {
                if self.bind.is_some() {
                    return Err(ConfigError::Invalid(
                        "stdio transport does not use a bind address".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// MCP server transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServerTransport {
    /// JSON-RPC over stdio with Content-Length framing.
    #[default]
    Stdio,
    /// JSON-RPC over an HTTP POST endpoint.
    Http,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}
