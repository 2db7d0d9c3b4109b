// crates/tansive-core/src/core/auth_code.rs
// ============================================================================
// Module: Tansive PKCE Auth Codes
// Description: The AuthCodeMetadata value stored by the PKCE auth-code store.
// Purpose: Model the single-use, code-challenge-bound authorization code.
// Dependencies: crate::core::identifiers, serde, time
// ============================================================================

//! ## Overview
//! An [`AuthCodeMetadata`] value is created with a session ID and a PKCE code
//! challenge, and consumed exactly once by presenting a matching code
//! verifier. The store that owns this type (`tansive-server::pkce`) is
//! responsible for the single-use, fail-closed redemption semantics; this
//! type only carries the data.

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::identifiers::SessionId;

/// Metadata recorded for a single outstanding PKCE authorization code.
///
/// # Invariants
/// - `code_challenge` is the base64url-encoded SHA-256 digest of the code
///   verifier the client will later present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthCodeMetadata {
    /// The session this code will be exchanged for.
    pub session_id: SessionId,
    /// Base64url-encoded SHA-256 digest of the expected code verifier.
    pub code_challenge: String,
    /// When this code expires (created + 10 minutes).
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl AuthCodeMetadata {
    /// Returns `true` when `now` is at or past `expires_at`.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::missing_docs_in_private_items,
        reason = "Test-only panic-based assertions are permitted."
    )]

    use time::Duration;

    use super::*;

    #[test]
    fn expiry_is_inclusive_at_the_boundary() {
        let now = OffsetDateTime::now_utc();
        let metadata = AuthCodeMetadata {
            session_id: SessionId::new(),
            code_challenge: "abc".to_string(),
            expires_at: now,
        };
        assert!(metadata.is_expired(now));
        assert!(!metadata.is_expired(now - Duration::seconds(1)));
    }
}
