// crates/wiki-relay-core/src/lib.rs
// ============================================================================
// Module: Wiki Relay Core
// Description: Canonical tool identifiers, catalog, and reply shapes.
// Purpose: Single source of truth shared by the router, server, and CLI.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This crate defines the contract surface of Wiki Relay: the canonical tool
//! names, the tool catalog served by `tools/list`, the credential newtype, and
//! the uniform reply shape returned by every tool call.
//! Invariants:
//! - The catalog and the dispatch switch both derive from [`ToolName`], so
//!   advertised and handled names cannot drift.
//! - [`ToolReply`] always carries at least one text content item.
//!
//! Security posture: tool inputs are untrusted; credentials are never logged.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod credential;
pub mod reply;
pub mod tooling;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::ToolDefinition;
pub use catalog::tool_definitions;
pub use credential::ApiToken;
pub use reply::ToolContent;
pub use reply::ToolReply;
pub use tooling::ToolName;
