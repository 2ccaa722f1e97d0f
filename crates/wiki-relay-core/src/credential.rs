// crates/wiki-relay-core/src/credential.rs
// ============================================================================
// Module: Credential
// Description: Opaque bearer token for wiki API authentication.
// Purpose: Keep the credential out of logs and debug output.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`ApiToken`] wraps the bearer token presented to the wiki backend. The
//! token is request-scoped configuration, never persisted and never printed:
//! `Debug` renders a redacted placeholder.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error as DeError;

// ============================================================================
// SECTION: Token
// ============================================================================

/// Opaque bearer token for the wiki REST API.
///
/// # Invariants
/// - The wrapped string is non-empty.
/// - The raw value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wraps a raw token string, rejecting empty values.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return None;
        }
        Some(Self(raw))
    }

    /// Returns the `Authorization` header value for this token.
    #[must_use]
    pub fn authorization_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("ApiToken(<redacted>)")
    }
}

impl<'de> Deserialize<'de> for ApiToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).ok_or_else(|| DeError::custom("api token must not be empty"))
    }
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
        clippy::use_debug,
        reason = "Test-only panic-based assertions and debug formatting."
    )]

    use super::ApiToken;

    #[test]
    fn rejects_empty_and_blank_tokens() {
        assert!(ApiToken::new("").is_none());
        assert!(ApiToken::new("   ").is_none());
    }

    #[test]
    fn builds_bearer_header_value() {
        let token = ApiToken::new("abc123").unwrap();
        assert_eq!(token.authorization_value(), "Bearer abc123");
    }

    #[test]
    fn deserialize_rejects_empty_tokens() {
        assert!(serde_json::from_str::<ApiToken>("\"\"").is_err());
        assert!(serde_json::from_str::<ApiToken>("\"tok\"").is_ok());
    }

    #[test]
    fn debug_output_is_redacted() {
        let token = ApiToken::new("super-secret").unwrap();
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("redacted"));
    }
}
