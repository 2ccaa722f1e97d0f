// crates/wiki-relay-core/src/tooling.rs
// ============================================================================
// Module: Tooling Identifiers
// Description: Canonical MCP tool identifiers for Wiki Relay.
// Purpose: Shared tool naming across catalog, router, and CLI.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Canonical tool identifiers used by Wiki Relay MCP.
//! These names are part of the external contract surface and must stay
//! bit-exact across releases.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Canonical tool names for Wiki Relay MCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    /// List every page path known to the wiki.
    GetPages,
    /// Create a page at a path (overwrite semantics at the backend).
    CreatePage,
    /// Edit a page at a path (same backend verb as create).
    EditPage,
    /// Fetch a page body by path.
    GetPage,
    /// Fetch a page body by identifier.
    GetPageById,
}

impl ToolName {
    /// Returns the canonical string name for the tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetPages => "get_pages",
            Self::CreatePage => "create_page",
            Self::EditPage => "edit_page",
            Self::GetPage => "get_page",
            Self::GetPageById => "get_page_by_id",
        }
    }

    /// Returns all Wiki Relay tool names in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::GetPages, Self::CreatePage, Self::EditPage, Self::GetPage, Self::GetPageById]
    }

    /// Parses a tool name from its string representation.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "get_pages" => Some(Self::GetPages),
            "create_page" => Some(Self::CreatePage),
            "edit_page" => Some(Self::EditPage),
            "get_page" => Some(Self::GetPage),
            "get_page_by_id" => Some(Self::GetPageById),
            _ => None,
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
