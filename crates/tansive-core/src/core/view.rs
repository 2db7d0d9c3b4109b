// crates/tansive-core/src/core/view.rs
// ============================================================================
// Module: Tansive Views
// Description: The persisted View record.
// Purpose: Name a scoped, adoptable bundle of policy rules.
// Dependencies: crate::core::identifiers, crate::core::rule, serde, time
// ============================================================================

//! ## Overview
//! A [`View`] is the persisted, labeled unit of policy adoption. Its
//! `label` is unique within `(tenant_id, catalog_id)`. Loading surfaces
//! "not found" distinctly from "unable to load" so callers can return 404 vs
//! 500 (see `tansive-core::interfaces::ViewRepository`).

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::identifiers::CatalogId;
use crate::core::identifiers::TenantId;
use crate::core::identifiers::ViewId;
use crate::core::rule::ViewDefinition;

/// A persisted, labeled view.
///
/// # Invariants
/// - `label` is unique within `(tenant_id, catalog_id)`; enforced by the
///   backing repository, not by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// The view's identifier.
    pub view_id: ViewId,
    /// Human-readable label, unique per `(tenant_id, catalog_id)`.
    pub label: String,
    /// The catalog this view is scoped under.
    pub catalog_id: CatalogId,
    /// The scope and rules this view grants.
    pub rules: ViewDefinition,
    /// The tenant that owns this view.
    pub tenant_id: TenantId,
    /// When this view was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl View {
    /// Returns the canonical `res://views/<label>` resource path for this
    /// view, rooted at the view's own scope.
    #[must_use]
    pub fn resource_path(&self) -> String {
        format!(
            "{}/views/{}",
            crate::core::resource::scope_resource_path(&self.rules.scope),
            self.label
        )
    }
}
