// crates/tansive-core/src/interfaces/mod.rs
// ============================================================================
// Module: Tansive Interfaces
// Description: Backend-agnostic repository and collaborator seams.
// Purpose: Define the contract surfaces tansive-server and tansive-store-sqlite implement.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the request pipeline and domain services integrate
//! with persistence and external collaborators without embedding
//! backend-specific details. Implementations must fail closed: a lookup
//! that cannot determine an answer is an error, never a silent `false`/`None`
//! that would be indistinguishable from "not found".

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::Action;
use crate::core::CatalogId;
use crate::core::NamespaceId;
use crate::core::Session;
use crate::core::SessionId;
use crate::core::SessionStatus;
use crate::core::SigningKey;
use crate::core::TenantId;
use crate::core::VariantId;
use crate::core::View;
use crate::core::ViewId;

// ============================================================================
// SECTION: Signing Key Repository
// ============================================================================

/// Signing key repository errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying storage I/O error.
    #[error("repository io error: {0}")]
    Io(String),
    /// Stored data failed to deserialize or violated an invariant.
    #[error("repository invalid data: {0}")]
    Invalid(String),
    /// A uniqueness constraint was violated on insert.
    #[error("repository conflict: {0}")]
    Conflict(String),
}

/// Persists and loads a tenant's signing keys.
///
/// # Invariants
/// - At most one row per tenant has `is_active = true`; enforced by the
///   implementation, e.g. via a unique partial index.
pub trait SigningKeyRepository {
    /// Loads the tenant's currently active signing key, if one exists.
    ///
    /// # Errors
    /// Returns [`RepositoryError`] when the load fails.
    fn load_active(&self, tenant_id: &TenantId) -> Result<Option<SigningKey>, RepositoryError>;

    /// Inserts a newly generated signing key as the tenant's active key,
    /// deactivating any previous active key.
    ///
    /// # Errors
    /// Returns [`RepositoryError`] when the insert fails; on failure, no
    /// partial state is left active.
    fn insert_active(&self, key: &SigningKey) -> Result<(), RepositoryError>;

    /// Reports repository readiness for the `/ready` endpoint.
    ///
    /// # Errors
    /// Returns [`RepositoryError`] when the backing store is unavailable.
    fn readiness(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: View Repository
// ============================================================================

/// Persists and loads views.
pub trait ViewRepository {
    /// Loads a view by its unique `(tenant_id, catalog_id, label)`.
    ///
    /// # Errors
    /// Returns [`RepositoryError`] when the load fails; returns `Ok(None)`,
    /// not an error, when no such view exists.
    fn get_by_label(
        &self,
        tenant_id: &TenantId,
        catalog_id: &CatalogId,
        label: &str,
    ) -> Result<Option<View>, RepositoryError>;

    /// Loads a view by its identifier, scoped to `tenant_id`.
    ///
    /// # Errors
    /// Returns [`RepositoryError`] when the load fails.
    fn get_by_id(
        &self,
        tenant_id: &TenantId,
        view_id: &ViewId,
    ) -> Result<Option<View>, RepositoryError>;

    /// Inserts a new view.
    ///
    /// # Errors
    /// Returns [`RepositoryError::Conflict`] when `(tenant_id, catalog_id,
    /// label)` already exists.
    fn insert(&self, view: &View) -> Result<(), RepositoryError>;

    /// Reports repository readiness for the `/ready` endpoint.
    ///
    /// # Errors
    /// Returns [`RepositoryError`] when the backing store is unavailable.
    fn readiness(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Session Repository
// ============================================================================

/// Persists and loads sessions.
pub trait SessionRepository {
    /// Inserts a newly created session.
    ///
    /// # Errors
    /// Returns [`RepositoryError::Conflict`] on a session ID collision.
    fn insert(&self, session: &Session) -> Result<(), RepositoryError>;

    /// Loads a session by identifier.
    ///
    /// # Errors
    /// Returns [`RepositoryError`] when the load fails.
    fn get(&self, session_id: &SessionId) -> Result<Option<Session>, RepositoryError>;

    /// Updates a session's in-band status; the sole permitted mutation
    /// during execution.
    ///
    /// # Errors
    /// Returns [`RepositoryError`] when the update fails.
    fn set_status_summary(
        &self,
        session_id: &SessionId,
        status: SessionStatus,
    ) -> Result<(), RepositoryError>;

    /// Reports repository readiness for the `/ready` endpoint.
    ///
    /// # Errors
    /// Returns [`RepositoryError`] when the backing store is unavailable.
    fn readiness(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Revocation Checker
// ============================================================================

/// Consulted during token validation; fails closed on error.
pub trait RevocationChecker {
    /// Returns `true` when the token identified by `jti` has been revoked.
    ///
    /// # Errors
    /// Returns [`RepositoryError`] when the check cannot be completed; a
    /// caller that cannot determine revocation status must treat the token
    /// as unauthorized rather than assume it is unrevoked.
    fn is_revoked(&self, jti: &str) -> Result<bool, RepositoryError>;
}

/// A [`RevocationChecker`] that never reports a token as revoked.
///
/// No revocation list exists yet; this stub preserves the call site so one
/// can be wired in without touching the token service.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRevocationChecker;

impl RevocationChecker for NoopRevocationChecker {
    fn is_revoked(&self, _jti: &str) -> Result<bool, RepositoryError> {
        Ok(false)
    }
}

// ============================================================================
// SECTION: Catalog Name Resolver
// ============================================================================

/// Resolves human-readable catalog-hierarchy names to identifiers.
pub trait CatalogNameResolver {
    /// Resolves a catalog name to its identifier.
    ///
    /// # Errors
    /// Returns [`RepositoryError`] when the lookup fails.
    fn resolve_catalog(
        &self,
        tenant_id: &TenantId,
        name: &str,
    ) -> Result<Option<CatalogId>, RepositoryError>;

    /// Resolves a variant name, scoped to a catalog, to its identifier.
    ///
    /// # Errors
    /// Returns [`RepositoryError`] when the lookup fails.
    fn resolve_variant(
        &self,
        tenant_id: &TenantId,
        catalog_id: &CatalogId,
        name: &str,
    ) -> Result<Option<VariantId>, RepositoryError>;

    /// Resolves a namespace name, scoped to a variant, to its identifier.
    ///
    /// # Errors
    /// Returns [`RepositoryError`] when the lookup fails.
    fn resolve_namespace(
        &self,
        tenant_id: &TenantId,
        variant_id: &VariantId,
        name: &str,
    ) -> Result<Option<NamespaceId>, RepositoryError>;
}

// ============================================================================
// SECTION: Skillset Lookup
// ============================================================================

/// Skillset lookup errors.
#[derive(Debug, Error)]
pub enum SkillsetLookupError {
    /// The named skillset or skill does not exist.
    #[error("skillset lookup: {0} not found")]
    NotFound(String),
    /// The lookup backend failed.
    #[error("skillset lookup io error: {0}")]
    Io(String),
}

/// Resolves a skill's exported actions, used by the session manager to
/// validate a session request against the adopted view.
pub trait SkillsetLookup {
    /// Returns the set of actions a skill exports for policy evaluation.
    ///
    /// # Errors
    /// Returns [`SkillsetLookupError`] when the skillset or skill is unknown,
    /// or the lookup backend fails.
    fn exported_actions(
        &self,
        tenant_id: &TenantId,
        skillset_path: &str,
        skill: &str,
    ) -> Result<Vec<Action>, SkillsetLookupError>;
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::missing_docs_in_private_items,
        reason = "Test-only panic-based assertions are permitted."
    )]

    use super::*;

    #[test]
    fn noop_revocation_checker_never_revokes() {
        let checker = NoopRevocationChecker;
        assert!(!checker.is_revoked("any-jti").unwrap());
    }
}
