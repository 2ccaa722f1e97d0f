// crates/wiki-relay-mcp/src/tools.rs
// ============================================================================
// Module: MCP Tool Router
// Description: Tool routing for the Wiki Relay MCP server.
// Purpose: Expose thin wrappers over the wiki backend client.
// Dependencies: wiki-relay-core, wiki-relay-client
// ============================================================================

//! ## Overview
//! The tool router dispatches MCP tool calls to the backend client. Each call
//! moves through two states, validating then terminal reply: the credential is
//! resolved first (call-scoped token, then the configured fallback), required
//! arguments are checked for presence and non-emptiness, the matching client
//! operation runs, and the outcome is rendered into a [`ToolReply`].
//!
//! ## Layer Responsibilities
//! - Route MCP tool calls to single backend exchanges.
//! - Normalize every recoverable failure into a text reply.
//! - Emit audit events for tool invocations.
//!
//! ## Invariants
//! - An unrecognized tool name is the only hard error.
//! - Missing credentials and missing arguments never reach the backend.
//! - Replies always carry at least one text item.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use wiki_relay_client::WikiApiError;
use wiki_relay_client::WikiClient;
use wiki_relay_core::ApiToken;
use wiki_relay_core::ToolDefinition;
use wiki_relay_core::ToolName;
use wiki_relay_core::ToolReply;
use wiki_relay_core::tool_definitions;

use crate::audit::AuditSink;
use crate::audit::ToolCallAuditEvent;
use crate::audit::ToolCallAuditEventParams;
use crate::config::ServerTransport;

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Call-scoped context supplied by the serving transport.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Transport used by the caller.
    pub transport: ServerTransport,
    /// Peer IP address when available.
    pub peer_ip: Option<IpAddr>,
    /// Call-scoped credential override (HTTP bearer header).
    pub bearer_token: Option<ApiToken>,
    /// Optional request identifier for auditing.
    pub request_id: Option<String>,
}

impl RequestContext {
    /// Builds a stdio request context.
    #[must_use]
    pub fn stdio() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            peer_ip: None,
            bearer_token: None,
            request_id: None,
        }
    }

    /// Builds an HTTP request context.
    #[must_use]
    pub fn http(peer_ip: Option<IpAddr>, bearer_token: Option<ApiToken>) -> Self {
        Self {
            transport: ServerTransport::Http,
            peer_ip,
            bearer_token,
            request_id: None,
        }
    }

    /// Attaches a request identifier for auditing.
    #[must_use]
    pub fn with_request_id(mut self, request_id: String) -> Self {
        self.request_id = Some(request_id);
        self
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Protocol-level tool errors.
///
/// Business failures (backend errors, missing pages, missing arguments,
/// missing credentials) are rendered as replies and never appear here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    /// Tool name not recognized.
    #[error("unknown tool")]
    UnknownTool,
    /// Tool payload serialization failed.
    #[error("serialization failure")]
    Serialization,
}

// ============================================================================
// SECTION: Tool Router
// ============================================================================

/// Instruction rendered when no credential is available anywhere.
pub const MISSING_TOKEN_HELP: &str = "No wiki API token is configured. Set backend.api_token in \
                                      the Wiki Relay config file, export WIKI_RELAY_API_TOKEN \
                                      before starting the server, or send an Authorization: \
                                      Bearer header with the request.";

/// Call outcome classification for audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallOutcome {
    /// Backend exchange succeeded.
    Ok,
    /// Backend exchange failed; failure rendered as text.
    BackendFailure,
    /// Required arguments missing; backend untouched.
    InvalidArguments,
    /// No credential available; backend untouched.
    MissingCredential,
    /// Tool name not recognized; surfaced as a hard error.
    UnknownTool,
}

impl CallOutcome {
    /// Returns a stable label for the outcome.
    const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::BackendFailure => "backend_failure",
            Self::InvalidArguments => "invalid_arguments",
            Self::MissingCredential => "missing_credential",
            Self::UnknownTool => "unknown_tool",
        }
    }
}

/// Router mapping MCP tool calls onto backend client operations.
pub struct ToolRouter {
    /// Backend client shared across calls.
    client: WikiClient,
    /// Process-wide credential fallback resolved at startup.
    api_token: Option<ApiToken>,
    /// Audit sink for tool invocations.
    audit: Arc<dyn AuditSink>,
}

impl ToolRouter {
    /// Builds a new tool router.
    #[must_use]
    pub fn new(client: WikiClient, api_token: Option<ApiToken>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            client,
            api_token,
            audit,
        }
    }

    /// Returns the tool definitions advertised to callers.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    /// Handles a tool call by name with a JSON argument bag.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] when the name is not in the
    /// catalog. Every other failure is rendered into the reply.
    pub fn handle_tool_call(
        &self,
        context: &RequestContext,
        name: &str,
        arguments: &Value,
    ) -> Result<ToolReply, ToolError> {
        let tool = ToolName::parse(name);
        let Some(token) = self.resolve_token(context) else {
            self.record(context, tool, CallOutcome::MissingCredential);
            return Ok(ToolReply::text(MISSING_TOKEN_HELP));
        };
        let Some(tool) = tool else {
            self.record(context, None, CallOutcome::UnknownTool);
            return Err(ToolError::UnknownTool);
        };
        let (reply, outcome) = match tool {
            ToolName::GetPages => self.get_pages(&token),
            ToolName::CreatePage | ToolName::EditPage => self.write_page(tool, arguments, &token),
            ToolName::GetPage => self.read_page_by_path(arguments, &token),
            ToolName::GetPageById => self.read_page_by_id(arguments, &token),
        };
        self.record(context, Some(tool), outcome);
        Ok(reply)
    }

    /// Resolves the credential, call-scoped override first.
    fn resolve_token(&self, context: &RequestContext) -> Option<ApiToken> {
        context.bearer_token.clone().or_else(|| self.api_token.clone())
    }

    /// Handles `get_pages`: header line plus one path per line.
    fn get_pages(&self, token: &ApiToken) -> (ToolReply, CallOutcome) {
        match self.client.list_pages(token) {
            Ok(paths) => {
                let mut text = String::from("Pages:");
                for path in &paths {
                    text.push('\n');
                    text.push_str(path);
                }
                (ToolReply::text(text), CallOutcome::Ok)
            }
            Err(err) => failure(ToolName::GetPages, &err),
        }
    }

    /// Handles `get_page`: replies with the raw page body.
    fn read_page_by_path(&self, arguments: &Value, token: &ApiToken) -> (ToolReply, CallOutcome) {
        let tool = ToolName::GetPage;
        let mut values = match required_strings(tool, arguments, &["path"]) {
            Ok(values) => values,
            Err(reply) => return (reply, CallOutcome::InvalidArguments),
        };
        let path = values.remove(0);
        match self.client.page_by_path(&path, token) {
            Ok(body) => (ToolReply::text(body), CallOutcome::Ok),
            Err(err) => failure(tool, &err),
        }
    }

    /// Handles `get_page_by_id`: replies with the raw page body.
    fn read_page_by_id(&self, arguments: &Value, token: &ApiToken) -> (ToolReply, CallOutcome) {
        let tool = ToolName::GetPageById;
        let mut values = match required_strings(tool, arguments, &["id"]) {
            Ok(values) => values,
            Err(reply) => return (reply, CallOutcome::InvalidArguments),
        };
        let id = values.remove(0);
        match self.client.page_by_id(&id, token) {
            Ok(body) => (ToolReply::text(body), CallOutcome::Ok),
            Err(err) => failure(tool, &err),
        }
    }

    /// Handles `create_page` and `edit_page`: both are backend overwrites.
    fn write_page(
        &self,
        tool: ToolName,
        arguments: &Value,
        token: &ApiToken,
    ) -> (ToolReply, CallOutcome) {
        let mut values = match required_strings(tool, arguments, &["path", "body"]) {
            Ok(values) => values,
            Err(reply) => return (reply, CallOutcome::InvalidArguments),
        };
        let body = values.pop().unwrap_or_default();
        let path = values.pop().unwrap_or_default();
        match self.client.write_page(&path, &body, token) {
            Ok(id) => {
                let confirmation = if tool == ToolName::CreatePage {
                    format!("Created page {path} (id {id})")
                } else {
                    format!("Updated page {path} (id {id})")
                };
                (ToolReply::text(confirmation), CallOutcome::Ok)
            }
            Err(err) => failure(tool, &err),
        }
    }

    /// Records an audit event for a handled call.
    fn record(&self, context: &RequestContext, tool: Option<ToolName>, outcome: CallOutcome) {
        let event = ToolCallAuditEvent::new(ToolCallAuditEventParams {
            transport: context.transport,
            request_id: context.request_id.clone(),
            tool,
            outcome: outcome.as_str(),
        });
        self.audit.record(&event);
    }
}

// ============================================================================
// SECTION: Rendering Helpers
// ============================================================================

/// Renders a backend failure into the uniform reply shape.
fn failure(tool: ToolName, err: &WikiApiError) -> (ToolReply, CallOutcome) {
    (ToolReply::text(format!("{tool} failed: {err}")), CallOutcome::BackendFailure)
}

/// Extracts required string arguments, collecting every missing field.
///
/// Presence is the only contract: values are accepted verbatim, but required
/// fields must be non-empty strings.
fn required_strings(
    tool: ToolName,
    arguments: &Value,
    fields: &[&str],
) -> Result<Vec<String>, ToolReply> {
    let mut values = Vec::with_capacity(fields.len());
    let mut missing = Vec::new();
    for field in fields {
        match arguments.get(*field).and_then(Value::as_str) {
            Some(value) if !value.is_empty() => values.push(value.to_string()),
            _ => missing.push(*field),
        }
    }
    if missing.is_empty() {
        Ok(values)
    } else {
        Err(ToolReply::text(format!(
            "{tool} failed: missing required argument(s) {}; received arguments: {arguments}",
            missing.join(", ")
        )))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
