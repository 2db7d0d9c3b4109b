// crates/tansive-token/src/claims.rs
// ============================================================================
// Module: Tansive Token Claims
// Description: The TokenClaims wire shape minted and validated by the token service.
// Purpose: Model the fixed claim set plus an open bag of caller-supplied claims.
// Dependencies: serde, serde_json, tansive-core
// ============================================================================

//! ## Overview
//! [`TokenClaims`] carries the fixed claims every Tansive token requires
//! (`view_id`, `tenant_id`, `iss`, `aud`, `jti`, `iat`, `nbf`, `exp`) plus an
//! `extra` bag for caller-supplied additional claims such as `sub` and
//! `token_use`. The bag is flattened into the top-level JWT payload on the
//! wire, matching how tokens produced by other issuers are usually read: a
//! claim consumer is never surprised by an unexpected nested object.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use tansive_core::core::TenantId;
use tansive_core::core::ViewId;

/// Prefix marking a `sub` claim as bound to an authenticated user.
pub const SUBJECT_USER_PREFIX: &str = "user/";
/// Prefix marking a `sub` claim as bound to a session (emitted to workers
/// after PKCE code exchange).
pub const SUBJECT_SESSION_PREFIX: &str = "session/";

/// The full claim set of a Tansive bearer token.
///
/// # Invariants
/// - `extra` never duplicates a fixed field name; the token service rejects
///   additional-claims maps that collide with a fixed field at mint time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// The view this token asserts.
    pub view_id: ViewId,
    /// The tenant this token was minted for.
    pub tenant_id: TenantId,
    /// Issuer, from configuration.
    pub iss: String,
    /// Audience, from configuration.
    pub aud: String,
    /// Unique token identifier (also the revocation-list key).
    pub jti: String,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Not-before, Unix seconds.
    pub nbf: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
    /// Caller-supplied additional claims (e.g. `sub`, `token_use`),
    /// flattened into the top-level JWT payload.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    /// Returns the `sub` claim, if present and a JSON string.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.extra.get("sub")?.as_str()
    }

    /// Returns the `token_use` claim, if present and a JSON string.
    #[must_use]
    pub fn token_use(&self) -> Option<&str> {
        self.extra.get("token_use")?.as_str()
    }

    /// Returns `true` when the `sub` claim is present and prefixed
    /// [`SUBJECT_USER_PREFIX`].
    #[must_use]
    pub fn is_user_bound(&self) -> bool {
        self.subject().is_some_and(|sub| sub.starts_with(SUBJECT_USER_PREFIX))
    }

    /// Returns `true` when the `sub` claim is present and prefixed
    /// [`SUBJECT_SESSION_PREFIX`].
    #[must_use]
    pub fn is_session_bound(&self) -> bool {
        self.subject().is_some_and(|sub| sub.starts_with(SUBJECT_SESSION_PREFIX))
    }

    /// Returns an arbitrary UUID-typed claim from the `extra` bag, parsing
    /// its string representation.
    #[must_use]
    pub fn get_uuid_claim(&self, name: &str) -> Option<uuid::Uuid> {
        self.extra.get(name)?.as_str()?.parse().ok()
    }
}
