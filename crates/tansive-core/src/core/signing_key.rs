// crates/tansive-core/src/core/signing_key.rs
// ============================================================================
// Module: Tansive Signing Key Metadata
// Description: The persisted SigningKey record (metadata only, no key material handling).
// Purpose: Model the at-rest shape of a signing key row.
// Dependencies: crate::core::identifiers, serde, time
// ============================================================================

//! ## Overview
//! This module models only the *record shape* of a signing key: its public
//! key bytes, its opaque encrypted-private-key blob, and its activation
//! state. Generating, encrypting, and decrypting key material is the
//! responsibility of `tansive-crypto`; this type is what gets persisted and
//! cached.
//!
//! # Invariants
//! - At most one row per tenant has `is_active = true`; enforced by the
//!   backing repository, not by this type.
//! - Expired/deactivated keys remain readable for verifying tokens signed
//!   before rotation until explicitly garbage-collected.

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::identifiers::SigningKeyId;
use crate::core::identifiers::TenantId;

/// A persisted signing key record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKey {
    /// The key's identifier.
    pub key_id: SigningKeyId,
    /// The tenant this key belongs to.
    pub tenant_id: TenantId,
    /// Raw Ed25519 public key bytes (32 bytes).
    pub public_key: Vec<u8>,
    /// The opaque encrypted private-key blob: `salt(16) || nonce(12) ||
    /// ciphertext || tag(16)`.
    pub encrypted_private_key: Vec<u8>,
    /// Whether this is the tenant's currently active signing key.
    pub is_active: bool,
    /// When this key was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When this key expires, if it has a defined expiry.
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
}
