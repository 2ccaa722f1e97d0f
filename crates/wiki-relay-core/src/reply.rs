// crates/wiki-relay-core/src/reply.rs
// ============================================================================
// Module: Tool Reply
// Description: Uniform reply shape for MCP tool calls.
// Purpose: Normalize every tool outcome into text content items.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every tool call, successful or not, renders into a [`ToolReply`] holding an
//! ordered sequence of content items. Business-level failures are replies, not
//! protocol errors; the reply always carries at least one text item.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Reply Types
// ============================================================================

/// Uniform externally visible result of a tool call.
///
/// # Invariants
/// - `content` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolReply {
    /// Ordered tool output content.
    pub content: Vec<ToolContent>,
}

impl ToolReply {
    /// Builds a reply holding a single text item.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: text.into(),
            }],
        }
    }
}

/// Tool output content items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolContent {
    /// Plain text tool output.
    Text {
        /// Text payload.
        text: String,
    },
}

// ============================================================================
// SECTION: Tests
// ============================================================================
