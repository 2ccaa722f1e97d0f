// crates/wiki-relay-core/src/catalog.rs
// ============================================================================
// Module: MCP Tool Catalog
// Description: Canonical MCP tool definitions and input schemas for Wiki Relay.
// Purpose: Provide the tool listing served by tools/list and printed by the CLI.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines the canonical MCP tool surface. Definitions are built
//! from [`ToolName::all`] so the listing and the dispatch switch share one
//! source of truth. Required fields are part of the compatibility surface:
//! `get_pages` (none), `create_page`/`edit_page` (`path`, `body`), `get_page`
//! (`path`), `get_page_by_id` (`id`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::tooling::ToolName;

// ============================================================================
// SECTION: Tool Definitions
// ============================================================================

/// Tool definition shape used by MCP tool listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// MCP tool name.
    pub name: ToolName,
    /// Tool description for clients.
    pub description: String,
    /// JSON schema for tool input.
    pub input_schema: Value,
}

/// Returns the canonical MCP tool definitions.
///
/// The order is intentional and matches [`ToolName::all`]; it is preserved in
/// listings to keep client diffs stable across releases.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    ToolName::all().iter().map(|tool| definition_for(*tool)).collect()
}

/// Builds the definition for a single tool.
fn definition_for(tool: ToolName) -> ToolDefinition {
    match tool {
        ToolName::GetPages => build_definition(
            tool,
            "List the path of every page on the wiki.",
            tool_input_schema(&json!({}), &[]),
        ),
        ToolName::CreatePage => build_definition(
            tool,
            "Create a wiki page at a path. Writing to an existing path overwrites it.",
            tool_input_schema(
                &json!({
                    "path": schema_page_path("Page path, for example /notes/today."),
                    "body": schema_text("Page body in wiki markup.")
                }),
                &["path", "body"],
            ),
        ),
        ToolName::EditPage => build_definition(
            tool,
            "Replace the body of a wiki page at a path. The previous body is overwritten.",
            tool_input_schema(
                &json!({
                    "path": schema_page_path("Page path, for example /notes/today."),
                    "body": schema_text("Replacement page body in wiki markup.")
                }),
                &["path", "body"],
            ),
        ),
        ToolName::GetPage => build_definition(
            tool,
            "Fetch the body of a wiki page by path.",
            tool_input_schema(
                &json!({
                    "path": schema_page_path("Page path, for example /notes/today.")
                }),
                &["path"],
            ),
        ),
        ToolName::GetPageById => build_definition(
            tool,
            "Fetch the body of a wiki page by its backend identifier.",
            tool_input_schema(
                &json!({
                    "id": schema_text("Backend page identifier.")
                }),
                &["id"],
            ),
        ),
    }
}

// ============================================================================
// SECTION: Schema Helpers
// ============================================================================

/// Builds a tool definition from its parts.
fn build_definition(name: ToolName, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name,
        description: description.to_string(),
        input_schema,
    }
}

/// Builds a standard tool input schema wrapper.
#[must_use]
fn tool_input_schema(properties: &Value, required: &[&str]) -> Value {
    let required_values: Vec<Value> =
        required.iter().map(|value| Value::String((*value).to_string())).collect();
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": required_values,
        "properties": properties,
        "additionalProperties": false
    })
}

/// Returns a schema describing wiki page paths.
#[must_use]
fn schema_page_path(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description
    })
}

/// Returns a schema describing plain text fields.
#[must_use]
fn schema_text(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
