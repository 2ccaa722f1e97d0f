// crates/wiki-relay-mcp/src/lib.rs
// ============================================================================
// Module: Wiki Relay MCP
// Description: MCP server, tool router, and configuration for Wiki Relay.
// Purpose: Expose wiki tools via JSON-RPC 2.0 over stdio and HTTP.
// Dependencies: wiki-relay-core, wiki-relay-client, axum, serde, tokio, toml
// ============================================================================

//! ## Overview
//! This crate wires the Wiki Relay tool surface into the Model Context
//! Protocol. The [`tools::ToolRouter`] resolves the credential, validates
//! arguments, invokes the backend client, and renders every outcome into a
//! uniform text reply; only an unrecognized tool name is surfaced as a
//! JSON-RPC error. The [`server::McpServer`] serves `tools/list` and
//! `tools/call` over stdio (Content-Length framing) and HTTP.
//! Invariants:
//! - Business-level failures are replies, never protocol errors.
//! - The backend is never contacted for missing credentials or arguments.
//! - Configuration fails closed at load time.
//!
//! Security posture: tool inputs are untrusted; credentials never appear in
//! audit output.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod config;
pub mod server;
pub mod tools;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use config::ConfigError;
pub use config::ServerTransport;
pub use config::WikiRelayConfig;
pub use server::McpServer;
pub use server::McpServerError;
pub use tools::RequestContext;
pub use tools::ToolError;
pub use tools::ToolRouter;
