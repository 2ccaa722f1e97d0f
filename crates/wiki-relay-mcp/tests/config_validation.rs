// crates/wiki-relay-mcp/tests/config_validation.rs
// ============================================================================
// Module: Config Validation Tests
// Description: Tests for configuration loading, validation, and fallbacks.
// Purpose: Ensure invalid configuration fails closed at load time.
// Dependencies: wiki-relay-mcp, tempfile
// ============================================================================

//! ## Overview
//! Tests configuration for:
//! - Happy path: minimal and full TOML documents
//! - Fail-closed validation: transports, binds, limits, backend settings
//! - Credential fallback: explicit token wins, environment merges in once

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use wiki_relay_mcp::ConfigError;
use wiki_relay_mcp::ServerTransport;
use wiki_relay_mcp::WikiRelayConfig;

// ============================================================================
// SECTION: Environment Helpers
// ============================================================================

/// Safe wrappers for test-only environment mutation.
mod test_env {
    #![allow(unsafe_code, reason = "Test harness mutates process env for configuration.")]

    /// Sets an environment variable for the current process.
    pub fn set_var(key: &str, value: &str) {
        // SAFETY: Tests control process lifecycle and set env vars before load.
        unsafe {
            std::env::set_var(key, value);
        }
    }

    /// Removes an environment variable from the current process.
    pub fn remove_var(key: &str) {
        // SAFETY: Tests cleanup env vars after use in a controlled process.
        unsafe {
            std::env::remove_var(key);
        }
    }
}

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Writes a config document into a temp dir and returns its path.
fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("wiki-relay.toml");
    fs::write(&path, content).unwrap();
    path
}

/// Minimal valid configuration document.
const MINIMAL_CONFIG: &str = r#"
[backend]
base_url = "https://wiki.example.com/_api/v3"
api_token = "tok"
"#;

// ============================================================================
// SECTION: Happy Path
// ============================================================================

#[test]
fn minimal_config_defaults_to_stdio() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, MINIMAL_CONFIG);

    let config = WikiRelayConfig::load(Some(&path)).unwrap();
    assert_eq!(config.server.transport, ServerTransport::Stdio);
    assert!(config.backend.api_token.is_some());
    assert_eq!(config.backend.client.timeout_ms, 10_000);
}

#[test]
fn full_config_parses_every_section() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[server]
transport = "http"
bind = "127.0.0.1:8831"
max_body_bytes = 65536

[backend]
base_url = "https://wiki.example.com/_api/v3"
api_token = "tok"
timeout_ms = 2500
max_response_bytes = 1048576
user_agent = "wiki-relay-test/0.1"
default_grant = 4
"#,
    );

    let config = WikiRelayConfig::load(Some(&path)).unwrap();
    assert_eq!(config.server.transport, ServerTransport::Http);
    assert_eq!(config.server.bind.as_deref(), Some("127.0.0.1:8831"));
    assert_eq!(config.server.max_body_bytes, 65536);
    assert_eq!(config.backend.client.default_grant, 4);
    assert_eq!(config.backend.client.timeout_ms, 2500);
}

// ============================================================================
// SECTION: Fail-Closed Validation
// ============================================================================

#[test]
fn missing_backend_section_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[server]\n");

    assert!(matches!(WikiRelayConfig::load(Some(&path)), Err(ConfigError::Parse(_))));
}

#[test]
fn http_transport_requires_a_bind_address() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[server]
transport = "http"

[backend]
base_url = "https://wiki.example.com"
api_token = "tok"
"#,
    );

    assert!(matches!(WikiRelayConfig::load(Some(&path)), Err(ConfigError::Invalid(_))));
}

#[test]
fn non_loopback_bind_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[server]
transport = "http"
bind = "0.0.0.0:8831"

[backend]
base_url = "https://wiki.example.com"
api_token = "tok"
"#,
    );

    let err = WikiRelayConfig::load(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("non-loopback"));
}

#[test]
fn stdio_transport_rejects_a_bind_address() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[server]
bind = "127.0.0.1:8831"

[backend]
base_url = "https://wiki.example.com"
api_token = "tok"
"#,
    );

    assert!(matches!(WikiRelayConfig::load(Some(&path)), Err(ConfigError::Invalid(_))));
}

#[test]
fn zero_max_body_bytes_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[server]
max_body_bytes = 0

[backend]
base_url = "https://wiki.example.com"
api_token = "tok"
"#,
    );

    assert!(matches!(WikiRelayConfig::load(Some(&path)), Err(ConfigError::Invalid(_))));
}

#[test]
fn cleartext_backend_requires_opt_in() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[backend]
base_url = "http://wiki.example.com"
api_token = "tok"
"#,
    );

    assert!(matches!(WikiRelayConfig::load(Some(&path)), Err(ConfigError::Invalid(_))));

    let path = write_config(
        &dir,
        r#"
[backend]
base_url = "http://wiki.example.com"
allow_http = true
api_token = "tok"
"#,
    );
    assert!(WikiRelayConfig::load(Some(&path)).is_ok());
}

#[test]
fn empty_api_token_is_rejected_at_parse_time() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[backend]
base_url = "https://wiki.example.com"
api_token = ""
"#,
    );

    assert!(matches!(WikiRelayConfig::load(Some(&path)), Err(ConfigError::Parse(_))));
}

#[test]
fn missing_config_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(matches!(WikiRelayConfig::load(Some(&path)), Err(ConfigError::Io(_))));
}

#[test]
fn oversized_config_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut content = String::from(MINIMAL_CONFIG);
    content.push_str(&format!("\n# {}\n", "x".repeat(1024 * 1024)));
    let path = write_config(&dir, &content);

    assert!(matches!(WikiRelayConfig::load(Some(&path)), Err(ConfigError::Invalid(_))));
}

// ============================================================================
// SECTION: Credential Fallback
// ============================================================================

/// Serializes tests that mutate the shared process environment.
static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[test]
fn environment_token_merges_in_when_config_has_none() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[backend]
base_url = "https://wiki.example.com"
"#,
    );

    test_env::set_var("WIKI_RELAY_API_TOKEN", "env-token");
    let config = WikiRelayConfig::load(Some(&path)).unwrap();
    test_env::remove_var("WIKI_RELAY_API_TOKEN");

    let token = config.backend.api_token.unwrap();
    assert_eq!(token.authorization_value(), "Bearer env-token");
}

#[test]
fn explicit_token_wins_over_environment() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, MINIMAL_CONFIG);

    test_env::set_var("WIKI_RELAY_API_TOKEN", "env-token");
    let config = WikiRelayConfig::load(Some(&path)).unwrap();
    test_env::remove_var("WIKI_RELAY_API_TOKEN");

    let token = config.backend.api_token.unwrap();
    assert_eq!(token.authorization_value(), "Bearer tok");
}
