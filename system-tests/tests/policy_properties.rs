// system-tests/tests/policy_properties.rs
// ============================================================================
// Module: Policy Properties
// Description: Universal properties of policy evaluation and view derivation.
// Purpose: Exercise deny precedence, admin-action closure, and the subset
//          law against the real `tansive-policy` engine.
// Dependencies: tansive-policy, tansive-core
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "System tests assert with panics; this crate is not published."
)]

mod helpers;

use tansive_core::core::Action;
use tansive_core::core::Intent;
use tansive_core::core::Rule;
use tansive_core::core::Scope;
use tansive_core::core::TargetResource;
use tansive_core::core::ViewDefinition;
use tansive_policy::engine::is_authorized;
use tansive_policy::engine::is_subset_of;
use tansive_policy::engine::validate_derived_view;

fn target(uri: &str) -> TargetResource {
    TargetResource::parse(uri).expect("valid target uri")
}

fn rule(intent: Intent, actions: &[Action], targets: &[&str]) -> Rule {
    Rule {
        intent,
        actions: actions.to_vec(),
        targets: targets.iter().map(|target| (*target).to_string()).collect(),
    }
}

/// A matching deny rule wins regardless of how many allow rules also match
/// the same action/target pair (universal property 4).
#[test]
fn deny_wins_over_any_number_of_allow_rules() {
    let view = ViewDefinition {
        scope: Scope::catalog("c"),
        rules: vec![
            rule(Intent::Allow, &[Action::ResourceDelete], &["res://catalog/c/variant/v/resource/critical"]),
            rule(Intent::Allow, &[Action::ResourceDelete], &["res://catalog/c/variant/v/resource/*"]),
            rule(Intent::Allow, &[Action::VariantAdmin], &["res://catalog/c/variant/v"]),
            rule(Intent::Deny, &[Action::ResourceDelete], &["res://catalog/c/variant/v/resource/critical"]),
        ],
    };
    let decision = is_authorized(&view, Action::ResourceDelete, &target("res://catalog/c/variant/v/resource/critical"));
    assert!(!decision);
}

/// An `allow(kind.admin, res://.../kind/<name>)` rule implicitly grants any
/// action under that resource's subtree (universal property 5).
#[test]
fn admin_allow_implies_any_action_on_the_subtree() {
    let view = ViewDefinition {
        scope: Scope::catalog("c"),
        rules: vec![rule(Intent::Allow, &[Action::VariantAdmin], &["res://catalog/c/variant/v"])],
    };
    assert!(is_authorized(&view, Action::ResourceRead, &target("res://catalog/c/variant/v/resource/anything")));
    assert!(is_authorized(&view, Action::ResourceDelete, &target("res://catalog/c/variant/v/resource/anything")));
    assert!(is_authorized(&view, Action::NamespaceAdmin, &target("res://catalog/c/variant/v/namespace/n")));
}

/// A narrower deny rule overrides the broader admin-implied grant for the
/// specific resource it names (still property 5, combined with property 4).
#[test]
fn admin_allow_is_overridden_by_a_narrower_deny() {
    let view = ViewDefinition {
        scope: Scope::catalog("c"),
        rules: vec![
            rule(Intent::Allow, &[Action::VariantAdmin], &["res://catalog/c/variant/v"]),
            rule(Intent::Deny, &[Action::ResourceDelete], &["res://catalog/c/variant/v/resource/critical"]),
        ],
    };
    assert!(!is_authorized(&view, Action::ResourceDelete, &target("res://catalog/c/variant/v/resource/critical")));
    assert!(is_authorized(&view, Action::ResourceRead, &target("res://catalog/c/variant/v/resource/critical")));
}

/// `isSubsetOf` is reflexive: every view is a subset of itself.
#[test]
fn subset_of_is_reflexive() {
    let view = ViewDefinition {
        scope: Scope::catalog("c"),
        rules: vec![rule(Intent::Allow, &[Action::ResourceRead], &["res://catalog/c/variant/v/resource/*"])],
    };
    assert!(is_subset_of(&view, &view));
}

/// `isSubsetOf` is transitive: if A is a subset of B and B is a subset of
/// C, then A is a subset of C.
#[test]
fn subset_of_is_transitive() {
    let broad = ViewDefinition {
        scope: Scope::catalog("c"),
        rules: vec![rule(Intent::Allow, &[Action::VariantAdmin], &["res://catalog/c/variant/v"])],
    };
    let medium = ViewDefinition {
        scope: Scope::catalog("c"),
        rules: vec![rule(Intent::Allow, &[Action::ResourceRead, Action::ResourceList], &["res://catalog/c/variant/v/resource/*"])],
    };
    let narrow = ViewDefinition {
        scope: Scope::catalog("c"),
        rules: vec![rule(Intent::Allow, &[Action::ResourceRead], &["res://catalog/c/variant/v/resource/only-one"])],
    };

    assert!(is_subset_of(&narrow, &medium));
    assert!(is_subset_of(&medium, &broad));
    assert!(is_subset_of(&narrow, &broad));
}

/// A child view that claims an action its parent never granted fails
/// derivation, even though narrowing the target alone would pass.
#[test]
fn derived_view_cannot_claim_an_ungranted_action() {
    let parent = ViewDefinition {
        scope: Scope::catalog("c"),
        rules: vec![rule(Intent::Allow, &[Action::ResourceRead], &["res://catalog/c/variant/v/resource/*"])],
    };
    let child = ViewDefinition {
        scope: Scope::catalog("c"),
        rules: vec![rule(Intent::Allow, &[Action::ResourceEdit], &["res://catalog/c/variant/v/resource/*"])],
    };
    assert!(!validate_derived_view(&parent, &child));
}

/// A child view narrowing both the action set and the target set of its
/// parent is a valid derivation.
#[test]
fn derived_view_may_narrow_actions_and_targets() {
    let parent = ViewDefinition {
        scope: Scope::catalog("c"),
        rules: vec![rule(Intent::Allow, &[Action::ResourceRead, Action::ResourceEdit], &["res://catalog/c/variant/v/resource/*"])],
    };
    let child = ViewDefinition {
        scope: Scope::catalog("c"),
        rules: vec![rule(Intent::Allow, &[Action::ResourceRead], &["res://catalog/c/variant/v/resource/only-one"])],
    };
    assert!(validate_derived_view(&parent, &child));
}
