// crates/tansive-server/src/skillset.rs
// ============================================================================
// Module: Skillset Lookup Adapter
// Description: A minimal SkillsetLookup standing in for declarative skillset storage.
// Purpose: Satisfy component 4.E.1 without a skillset CRUD backend.
// Dependencies: tansive-core
// ============================================================================

//! ## Overview
//! Declarative skillset CRUD is out of core scope. [`SkillsetLookupStub`]
//! is the narrow, explicitly provisional [`SkillsetLookup`] implementation
//! this server wires up in its place: every skill is reported as exporting
//! no actions, so a session can only be created against a skill once a real
//! catalog-backed lookup replaces this stub. This mirrors the
//! `NamespaceAuthority`/`TenantAuthorizer` seam idiom used elsewhere in this
//! codebase for external collaborators that have no first-party
//! implementation yet.

use tansive_core::core::Action;
use tansive_core::core::TenantId;
use tansive_core::interfaces::SkillsetLookup;
use tansive_core::interfaces::SkillsetLookupError;

/// A [`SkillsetLookup`] that reports every skill as exporting no actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillsetLookupStub;

impl SkillsetLookup for SkillsetLookupStub {
    fn exported_actions(
        &self,
        _tenant_id: &TenantId,
        _skillset_path: &str,
        _skill: &str,
    ) -> Result<Vec<Action>, SkillsetLookupError> {
        Ok(Vec::new())
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
    fn stub_exports_no_actions() {
        let lookup = SkillsetLookupStub;
        let tenant_id = TenantId::new("T1").unwrap();
        assert_eq!(lookup.exported_actions(&tenant_id, "/tools", "deploy").unwrap(), Vec::new());
    }
}
