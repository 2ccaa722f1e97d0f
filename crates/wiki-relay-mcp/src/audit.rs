// crates/wiki-relay-mcp/src/audit.rs
// ============================================================================
// Module: MCP Audit Logging
// Description: Structured audit events for tool call handling.
// Purpose: Emit redacted audit logs without hard dependencies.
// Dependencies: wiki-relay-core, serde
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks for tool call logging.
//! It is intentionally lightweight so deployments can route events to their
//! preferred logging pipeline without redesign. Events carry classification
//! labels only; credentials and page bodies never appear in audit output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use wiki_relay_core::ToolName;

use crate::config::ServerTransport;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Tool call audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Transport used for the request.
    pub transport: ServerTransport,
    /// Request identifier when provided.
    pub request_id: Option<String>,
    /// Tool name when recognized.
    pub tool: Option<ToolName>,
    /// Call outcome classification label.
    pub outcome: &'static str,
}

/// Inputs required to construct a tool call audit event.
pub struct ToolCallAuditEventParams {
    /// Transport used for the request.
    pub transport: ServerTransport,
    /// Request identifier when provided.
    pub request_id: Option<String>,
    /// Tool name when recognized.
    pub tool: Option<ToolName>,
    /// Call outcome classification label.
    pub outcome: &'static str,
}

impl ToolCallAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ToolCallAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "tool_call",
            timestamp_ms,
            transport: params.transport,
            request_id: params.request_id,
            tool: params.tool,
            outcome: params.outcome,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for tool call events.
pub trait AuditSink: Send + Sync {
    /// Records an audit event. Sink failures must not alter tool outcomes.
    fn record(&self, event: &ToolCallAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &ToolCallAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &ToolCallAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions."
    )]

    use wiki_relay_core::ToolName;

    use super::ToolCallAuditEvent;
    use super::ToolCallAuditEventParams;
    use crate::config::ServerTransport;

    #[test]
    fn event_serializes_labels_without_payload_data() {
        let event = ToolCallAuditEvent::new(ToolCallAuditEventParams {
            transport: ServerTransport::Stdio,
            request_id: Some("7".to_string()),
            tool: Some(ToolName::GetPage),
            outcome: "ok",
        });
        let encoded = serde_json::to_value(&event).unwrap();
        assert_eq!(encoded["event"], "tool_call");
        assert_eq!(encoded["transport"], "stdio");
        assert_eq!(encoded["tool"], "get_page");
        assert_eq!(encoded["outcome"], "ok");
    }
}
