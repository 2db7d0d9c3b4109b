// crates/tansive-contract/src/dto.rs
// ============================================================================
// Module: Tansive Wire DTOs
// Description: JSON request/response shapes for the HTTP surface.
// Purpose: Give the server and any client a single canonical wire vocabulary.
// Dependencies: serde, serde_json, tansive-core, time
// ============================================================================

//! ## Overview
//! These types are the JSON bodies actually written to and read from the
//! wire; domain logic lives in `tansive-core`/`tansive-token`/`tansive-policy`.
//! Every response here round-trips through `serde_json` without loss.

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use tansive_core::core::Action;
use tansive_core::core::ViewDefinition;

// ============================================================================
// SECTION: Auth
// ============================================================================

/// Response body for `POST /auth/adopt-view/{catalogRef}/{viewLabel}` and
/// `POST /auth/adopt-default-view/{catalogRef}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdoptViewResponse {
    /// The minted bearer token.
    pub token: String,
    /// When the token expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

// ============================================================================
// SECTION: Sessions
// ============================================================================

/// Response body for an interactive session creation
/// (`POST /sessions?interactive=true&code_challenge=…`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionInteractiveResponse {
    /// The PKCE authorization code the caller must exchange.
    pub code: String,
    /// URL of the tangent (external worker) that will execute the session.
    pub tangent_url: String,
}

/// Response body for a non-interactive (batch) session creation
/// (`POST /sessions`, no `interactive=true`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionBatchResponse {
    /// The newly created session's identifier.
    pub session_id: String,
}

/// Response body for `POST /sessions/execution-state?code=…&code_verifier=…`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeExecutionTokenResponse {
    /// The minted session-scoped bearer token.
    pub token: String,
    /// When the token expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expiry: OffsetDateTime,
}

// ============================================================================
// SECTION: Operational Endpoints
// ============================================================================

/// Response body for `GET /version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
    /// The running server's crate version.
    pub version: String,
}

/// Response body for `GET /ready` on success; a failed readiness check
/// returns [`tansive_core::core::ErrorResponse`] at 503 instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyResponse {
    /// Always `true` when this body is returned at all.
    pub ready: bool,
}

/// A single JSON Web Key, OKP/Ed25519 shape, as served by
/// `GET /.well-known/jwks.json`.
///
/// # Invariants
/// - `kty` is always `"OKP"` and `crv` is always `"Ed25519"`; Tansive mints
///   only EdDSA tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    /// Key type; always `"OKP"`.
    pub kty: String,
    /// Curve; always `"Ed25519"`.
    pub crv: String,
    /// Intended use; always `"sig"`.
    #[serde(rename = "use")]
    pub use_: String,
    /// Base64url-encoded public key bytes.
    pub x: String,
}

/// Response body for `GET /.well-known/jwks.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwksResponse {
    /// The tenant's currently active public keys (normally exactly one).
    pub keys: Vec<JsonWebKey>,
}

// ============================================================================
// SECTION: Declarative Object Management (views)
// ============================================================================

/// Request body for creating a view (`POST /views`).
///
/// Catalog/variant/namespace/resource/skillset CRUD bodies are out of core
/// (see §4.E's explicit non-goal); only views are modeled here, since view
/// creation is required to exercise adoption and session creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateViewRequest {
    /// The label this view will be addressable by within its catalog.
    pub label: String,
    /// The scope and rules this view grants.
    pub rules: ViewDefinition,
}

/// Response body for a successfully created or loaded view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewResponse {
    /// The view's identifier.
    pub view_id: String,
    /// The view's label.
    pub label: String,
    /// The scope and rules this view grants.
    pub rules: ViewDefinition,
}

/// A single exported action entry, used by declarative skillset listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedActionEntry {
    /// The skill name this action belongs to.
    pub skill: String,
    /// The action itself.
    pub action: Action,
}
