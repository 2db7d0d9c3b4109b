// crates/tansive-core/src/core/rule.rs
// ============================================================================
// Module: Tansive Policy Rules
// Description: Actions, rule intents, and the allow/deny rule set a view carries.
// Purpose: Define the declarative vocabulary the policy engine evaluates.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Rule`] grants or denies a set of [`Action`]s on a set of target
//! resource strings. A [`ViewDefinition`] bundles a [`Scope`] with the rules
//! that apply under it. Matching, admin expansion, and subset semantics are
//! implemented by the policy engine crate; this module only models the
//! vocabulary.

use serde::Deserialize;
use serde::Serialize;

use crate::core::resource::Scope;

// ============================================================================
// SECTION: Action
// ============================================================================

/// A fixed, enumerated action grouped by resource kind.
///
/// # Invariants
/// - `as_str`/`FromStr` round-trip for every variant.
/// - `kind` returns the scope-prefix kind an admin action of the same kind
///   implicitly expands over (see [`Action::is_admin`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// `catalog.admin` — implicitly grants all narrower catalog-kind actions.
    CatalogAdmin,
    /// `catalog.adoptView` — adopt a view scoped to this catalog.
    CatalogAdoptView,
    /// `variant.admin` — implicitly grants all narrower variant-kind actions.
    VariantAdmin,
    /// `namespace.admin` — implicitly grants all narrower namespace-kind actions.
    NamespaceAdmin,
    /// `namespace.list` — list namespaces.
    NamespaceList,
    /// `resource.read` — read a resource.
    ResourceRead,
    /// `resource.put` — create or replace a resource.
    ResourcePut,
    /// `resource.edit` — update a resource.
    ResourceEdit,
    /// `resource.delete` — delete a resource.
    ResourceDelete,
    /// `resource.list` — list resources.
    ResourceList,
    /// `skillset.use` — invoke a skill from a skillset.
    SkillsetUse,
    /// `skillset.list` — list skillsets.
    SkillsetList,
    /// `skillset.admin` — implicitly grants all narrower skillset-kind actions.
    SkillsetAdmin,
    /// `tangent.create` — register an external worker.
    TangentCreate,
}

impl Action {
    /// Returns the stable wire label for this action, e.g. `catalog.admin`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CatalogAdmin => "catalog.admin",
            Self::CatalogAdoptView => "catalog.adoptView",
            Self::VariantAdmin => "variant.admin",
            Self::NamespaceAdmin => "namespace.admin",
            Self::NamespaceList => "namespace.list",
            Self::ResourceRead => "resource.read",
            Self::ResourcePut => "resource.put",
            Self::ResourceEdit => "resource.edit",
            Self::ResourceDelete => "resource.delete",
            Self::ResourceList => "resource.list",
            Self::SkillsetUse => "skillset.use",
            Self::SkillsetList => "skillset.list",
            Self::SkillsetAdmin => "skillset.admin",
            Self::TangentCreate => "tangent.create",
        }
    }

    /// Returns the scope-prefix kind this action, if it is an admin action,
    /// expands over (`catalog`, `variant`, `namespace`, or `skillset`);
    /// `None` for non-admin actions.
    #[must_use]
    pub const fn admin_kind(self) -> Option<&'static str> {
        match self {
            Self::CatalogAdmin => Some("catalog"),
            Self::VariantAdmin => Some("variant"),
            Self::NamespaceAdmin => Some("namespace"),
            Self::SkillsetAdmin => Some("skillset"),
            _ => None,
        }
    }

    /// Returns `true` when this action is an admin (implicit-grant) action.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        self.admin_kind().is_some()
    }
}

impl std::str::FromStr for Action {
    type Err = UnknownActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "catalog.admin" => Self::CatalogAdmin,
            "catalog.adoptView" => Self::CatalogAdoptView,
            "variant.admin" => Self::VariantAdmin,
            "namespace.admin" => Self::NamespaceAdmin,
            "namespace.list" => Self::NamespaceList,
            "resource.read" => Self::ResourceRead,
            "resource.put" => Self::ResourcePut,
            "resource.edit" => Self::ResourceEdit,
            "resource.delete" => Self::ResourceDelete,
            "resource.list" => Self::ResourceList,
            "skillset.use" => Self::SkillsetUse,
            "skillset.list" => Self::SkillsetList,
            "skillset.admin" => Self::SkillsetAdmin,
            "tangent.create" => Self::TangentCreate,
            other => return Err(UnknownActionError(other.to_string())),
        })
    }
}

/// Returned when a string does not name a known [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}'")]
pub struct UnknownActionError(String);

// ============================================================================
// SECTION: Rule & ViewDefinition
// ============================================================================

/// Whether a rule allows or denies the actions/targets it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// The rule grants the named actions on the named targets.
    Allow,
    /// The rule forbids the named actions on the named targets.
    Deny,
}

/// A single allow/deny rule: `{ intent, actions, targets }`.
///
/// # Invariants
/// - `actions` and `targets` are each non-empty for a well-formed rule; the
///   policy engine treats an empty list as matching nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Whether this rule allows or denies.
    pub intent: Intent,
    /// Actions this rule covers.
    pub actions: Vec<Action>,
    /// Target resource URI strings (`res://…`), possibly containing `*`
    /// wildcard segments.
    pub targets: Vec<String>,
}

/// A scoped, deep-copyable bundle of rules: `{ scope, rules }`.
///
/// # Invariants
/// - Rule targets are interpreted relative to `scope` for authoring
///   convenience but are matched against fully canonicalized absolute paths
///   by the policy engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDefinition {
    /// The scope this view's rules apply under.
    pub scope: Scope,
    /// The rules that make up this view.
    pub rules: Vec<Rule>,
}

impl ViewDefinition {
    /// Builds an empty view definition scoped to `scope`.
    #[must_use]
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            rules: Vec::new(),
        }
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
    fn action_str_round_trips() {
        for action in [
            Action::CatalogAdmin,
            Action::ResourceRead,
            Action::SkillsetAdmin,
            Action::TangentCreate,
        ] {
            let parsed: Action = action.as_str().parse().expect("known action");
            assert_eq!(parsed, action);
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!("resource.teleport".parse::<Action>().is_err());
    }

    #[test]
    fn admin_kind_identifies_scope_prefix() {
        assert_eq!(Action::CatalogAdmin.admin_kind(), Some("catalog"));
        assert_eq!(Action::ResourceRead.admin_kind(), None);
    }
}
