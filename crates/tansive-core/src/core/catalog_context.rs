// crates/tansive-core/src/core/catalog_context.rs
// ============================================================================
// Module: Tansive Catalog Context
// Description: The ephemeral per-request CatalogContext value.
// Purpose: Carry tenant/project/catalog/variant/namespace/subject through a request.
// Dependencies: crate::core::identifiers, crate::core::rule
// ============================================================================

//! ## Overview
//! [`CatalogContext`] is the request-scoped ambient value threaded through
//! the request context pipeline (component 4.F). Per the "request-scoped
//! ambient context" design note, it is an explicit, immutable-by-convention
//! carrier: each pipeline stage that learns something new returns a fresh
//! context via a `with_*` constructor rather than mutating one in place, so
//! middleware composition stays referentially sound.

use crate::core::identifiers::CatalogId;
use crate::core::identifiers::NamespaceId;
use crate::core::identifiers::ProjectId;
use crate::core::identifiers::SessionId;
use crate::core::identifiers::TenantId;
use crate::core::identifiers::VariantId;
use crate::core::rule::ViewDefinition;

/// Which kind of subject authenticated the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// A human user, identified by an opaque user ID.
    User {
        /// The authenticated user's identifier.
        user_id: String,
    },
    /// A worker acting on behalf of a session.
    Session {
        /// The session this request is bound to.
        session_id: SessionId,
    },
}

/// The ephemeral, per-request catalog context.
///
/// # Invariants
/// - `catalog_id`/`variant_id`/`namespace_id` are filled in by the
///   catalog-context-loading pipeline stage (4.F step 4) from, in order of
///   precedence, explicit URL params, query params, request body metadata,
///   then the view's own scope; absent fields stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogContext {
    /// The authenticated tenant.
    pub tenant_id: TenantId,
    /// The project this request operates under, if resolved.
    pub project_id: Option<ProjectId>,
    /// The catalog this request operates under, if resolved.
    pub catalog_id: Option<CatalogId>,
    /// The variant this request operates under, if resolved.
    pub variant_id: Option<VariantId>,
    /// The namespace this request operates under, if resolved.
    pub namespace_id: Option<NamespaceId>,
    /// Who authenticated this request.
    pub subject: Subject,
    /// The view definition asserted by the bearer token, once authenticated.
    pub view_definition: Option<ViewDefinition>,
}

impl CatalogContext {
    /// Builds a fresh context for the given tenant and subject, with no
    /// catalog-hierarchy fields resolved yet.
    #[must_use]
    pub fn new(tenant_id: TenantId, subject: Subject) -> Self {
        Self {
            tenant_id,
            project_id: None,
            catalog_id: None,
            variant_id: None,
            namespace_id: None,
            subject,
            view_definition: None,
        }
    }

    /// Returns a new context with `catalog_id` set, leaving `self` unchanged.
    #[must_use]
    pub fn with_catalog_id(mut self, catalog_id: CatalogId) -> Self {
        self.catalog_id = Some(catalog_id);
        self
    }

    /// Returns a new context with `variant_id` set, leaving `self` unchanged.
    #[must_use]
    pub fn with_variant_id(mut self, variant_id: VariantId) -> Self {
        self.variant_id = Some(variant_id);
        self
    }

    /// Returns a new context with `namespace_id` set, leaving `self`
    /// unchanged.
    #[must_use]
    pub fn with_namespace_id(mut self, namespace_id: NamespaceId) -> Self {
        self.namespace_id = Some(namespace_id);
        self
    }

    /// Returns a new context with `view_definition` set, leaving `self`
    /// unchanged.
    #[must_use]
    pub fn with_view_definition(mut self, view_definition: ViewDefinition) -> Self {
        self.view_definition = Some(view_definition);
        self
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

    use super::*;

    #[test]
    fn with_constructors_do_not_mutate_in_place() {
        let base = CatalogContext::new(
            TenantId::new("T1").unwrap(),
            Subject::User { user_id: "u1".to_string() },
        );
        let with_catalog = base.clone().with_catalog_id(CatalogId::new());
        assert!(base.catalog_id.is_none());
        assert!(with_catalog.catalog_id.is_some());
    }
}
