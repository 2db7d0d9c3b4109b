// crates/tansive-policy/tests/policy_properties.rs
// ============================================================================
// Module: Tansive Policy Properties
// Description: Property-based tests for deny-wins, admin closure, and the subset law.
// Purpose: Exercise the policy engine across generated rule sets, not just fixed examples.
// Dependencies: proptest, tansive-core, tansive-policy
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "Test-only panic-based assertions are permitted."
)]

use proptest::prelude::*;
use tansive_core::core::Action;
use tansive_core::core::Intent;
use tansive_core::core::Rule;
use tansive_core::core::Scope;
use tansive_core::core::TargetResource;
use tansive_core::core::ViewDefinition;
use tansive_policy::is_authorized;
use tansive_policy::is_subset_of;

fn resource_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,8}"
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::ResourceRead),
        Just(Action::ResourcePut),
        Just(Action::ResourceEdit),
        Just(Action::ResourceDelete),
        Just(Action::ResourceList),
        Just(Action::SkillsetUse),
    ]
}

proptest! {
    /// P4: a deny rule covering the requested action and target always wins,
    /// no matter what allow or admin rules are also present.
    #[test]
    fn deny_always_wins(catalog in resource_name_strategy(), name in resource_name_strategy(), action in action_strategy()) {
        let scope = Scope::catalog(catalog);
        let target_str = format!("resource/{name}");
        let view = ViewDefinition {
            scope: scope.clone(),
            rules: vec![
                Rule {
                    intent: Intent::Allow,
                    actions: vec![Action::CatalogAdmin],
                    targets: vec![format!("res://catalog/{}", scope.catalog)],
                },
                Rule {
                    intent: Intent::Allow,
                    actions: vec![action],
                    targets: vec![target_str.clone()],
                },
                Rule {
                    intent: Intent::Deny,
                    actions: vec![action],
                    targets: vec![target_str.clone()],
                },
            ],
        };
        let target = TargetResource::parse(&format!("res://catalog/{}/resource/{name}", scope.catalog)).unwrap();
        prop_assert!(!is_authorized(&view, action, &target));
    }

    /// P5: an admin allow-rule at the catalog root authorizes any action on
    /// any resource nested under that catalog, absent a conflicting deny.
    #[test]
    fn admin_closure_grants_narrower_actions(catalog in resource_name_strategy(), name in resource_name_strategy(), action in action_strategy()) {
        let view = ViewDefinition {
            scope: Scope::catalog(catalog.clone()),
            rules: vec![Rule {
                intent: Intent::Allow,
                actions: vec![Action::CatalogAdmin],
                targets: vec![format!("res://catalog/{catalog}")],
            }],
        };
        let target = TargetResource::parse(&format!("res://catalog/{catalog}/resource/{name}")).unwrap();
        prop_assert!(is_authorized(&view, action, &target));
    }

    /// P6 (reflexive): every view is a subset of itself.
    #[test]
    fn subset_is_reflexive(catalog in resource_name_strategy(), name in resource_name_strategy(), action in action_strategy()) {
        let view = ViewDefinition {
            scope: Scope::catalog(catalog),
            rules: vec![Rule {
                intent: Intent::Allow,
                actions: vec![action],
                targets: vec![format!("resource/{name}")],
            }],
        };
        prop_assert!(is_subset_of(&view, &view));
    }

    /// P6 (transitive): if `a` is a subset of `b` and `b` is a subset of a
    /// more permissive `c`, then `a` is a subset of `c`.
    #[test]
    fn subset_is_transitive(catalog in resource_name_strategy(), name in resource_name_strategy()) {
        let scope = Scope::catalog(catalog);
        let narrow = ViewDefinition {
            scope: scope.clone(),
            rules: vec![Rule {
                intent: Intent::Allow,
                actions: vec![Action::ResourceRead],
                targets: vec![format!("resource/{name}")],
            }],
        };
        let medium = ViewDefinition {
            scope: scope.clone(),
            rules: vec![Rule {
                intent: Intent::Allow,
                actions: vec![Action::ResourceRead],
                targets: vec!["resource/*".to_string()],
            }],
        };
        let broad = ViewDefinition {
            scope,
            rules: vec![Rule {
                intent: Intent::Allow,
                actions: vec![Action::CatalogAdmin],
                targets: vec!["res://catalog/*".to_string()],
            }],
        };
        prop_assert!(is_subset_of(&narrow, &medium));
        prop_assert!(is_subset_of(&medium, &broad));
        prop_assert!(is_subset_of(&narrow, &broad));
    }
}
