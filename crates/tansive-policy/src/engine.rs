// crates/tansive-policy/src/engine.rs
// ============================================================================
// Module: Tansive Policy Engine
// Description: Action authorization, admin expansion, and view-subset/derivation checks.
// Purpose: Decide whether an action is permitted and whether one view derives from another.
// Dependencies: tansive-core, crate::matcher
// ============================================================================

//! ## Overview
//! [`is_authorized`] evaluates a single `(action, target)` pair against a
//! view's rule set in three passes — admin expansion, explicit allow,
//! explicit deny — so that deny always wins regardless of the order rules
//! were authored in. [`is_subset_of`] and [`validate_derived_view`] answer
//! whether a child view's authority is wholly contained in a parent's,
//! the gate used when adopting a view or creating a session.

use tansive_core::core::Action;
use tansive_core::core::Intent;
use tansive_core::core::TargetResource;
use tansive_core::core::ViewDefinition;

use crate::matcher::admin_match;
use crate::matcher::canonicalize_target;
use crate::matcher::is_prefix;
use crate::matcher::segments_match;

/// Evaluates whether `action` is permitted on `target` under `view`'s rules.
///
/// Deny always wins, including over admin grants; the order rules appear
/// in `view.rules` does not affect the outcome.
#[must_use]
pub fn is_authorized(view: &ViewDefinition, action: Action, target: &TargetResource) -> bool {
    let actual = target.segments();
    let mut allow = false;

    for rule in &view.rules {
        if rule.intent != Intent::Allow {
            continue;
        }
        for rule_action in &rule.actions {
            let Some(kind) = rule_action.admin_kind() else {
                continue;
            };
            for raw_target in &rule.targets {
                let Ok(rule_target) = canonicalize_target(&view.scope, raw_target) else {
                    continue;
                };
                let rule_segments = rule_target.segments();
                if admin_match(rule_segments, kind)
                    && (is_prefix(rule_segments, actual) || segments_match(rule_segments, actual))
                {
                    allow = true;
                }
            }
        }
    }

    for rule in &view.rules {
        if rule.intent != Intent::Allow || !rule.actions.contains(&action) {
            continue;
        }
        for raw_target in &rule.targets {
            if let Ok(rule_target) = canonicalize_target(&view.scope, raw_target) {
                if segments_match(rule_target.segments(), actual) {
                    allow = true;
                }
            }
        }
    }

    for rule in &view.rules {
        if rule.intent != Intent::Deny || !rule.actions.contains(&action) {
            continue;
        }
        for raw_target in &rule.targets {
            if let Ok(rule_target) = canonicalize_target(&view.scope, raw_target) {
                let rule_segments = rule_target.segments();
                if segments_match(rule_segments, actual) || segments_match(actual, rule_segments) {
                    allow = false;
                }
            }
        }
    }

    allow
}

/// Returns `true` when every allow-rule in `child` is authorized by
/// `parent`'s rules. Deny rules in `child` are ignored — they are strictly
/// more restrictive than their absence.
///
/// A child rule target that fails to canonicalize makes the check fail
/// closed (treated as not a subset), since the engine cannot prove
/// containment for a target it cannot parse.
#[must_use]
pub fn is_subset_of(child: &ViewDefinition, parent: &ViewDefinition) -> bool {
    for rule in &child.rules {
        if rule.intent != Intent::Allow {
            continue;
        }
        for raw_target in &rule.targets {
            let Ok(target) = canonicalize_target(&child.scope, raw_target) else {
                return false;
            };
            for action in &rule.actions {
                if !is_authorized(parent, *action, &target) {
                    return false;
                }
            }
        }
    }
    true
}

/// Returns `true` when `child` is a valid derivation of `parent`: `child`'s
/// scope is equal to or a sub-scope of `parent`'s, and `child`'s rules are a
/// subset of `parent`'s.
#[must_use]
pub fn validate_derived_view(parent: &ViewDefinition, child: &ViewDefinition) -> bool {
    child.scope.is_sub_scope_of(&parent.scope) && is_subset_of(child, parent)
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::missing_docs_in_private_items,
        reason = "Test-only panic-based assertions are permitted."
    )]

    use tansive_core::core::Rule;
    use tansive_core::core::Scope;

    use super::*;

    fn view(scope: Scope, rules: Vec<Rule>) -> ViewDefinition {
        ViewDefinition { scope, rules }
    }

    fn target(uri: &str) -> TargetResource {
        TargetResource::parse(uri).unwrap()
    }

    #[test]
    fn explicit_allow_grants_the_action() {
        let v = view(
            Scope::catalog("c"),
            vec![Rule {
                intent: Intent::Allow,
                actions: vec![Action::ResourceRead],
                targets: vec!["resource/file".to_string()],
            }],
        );
        assert!(is_authorized(&v, Action::ResourceRead, &target("res://catalog/c/resource/file")));
        assert!(!is_authorized(&v, Action::ResourceDelete, &target("res://catalog/c/resource/file")));
    }

    #[test]
    fn deny_always_wins_over_allow_and_admin() {
        let v = view(
            Scope::catalog("c"),
            vec![
                Rule {
                    intent: Intent::Allow,
                    actions: vec![Action::CatalogAdmin],
                    targets: vec!["res://catalog/c".to_string()],
                },
                Rule {
                    intent: Intent::Deny,
                    actions: vec![Action::ResourceDelete],
                    targets: vec!["resource/file".to_string()],
                },
            ],
        );
        assert!(is_authorized(&v, Action::ResourceRead, &target("res://catalog/c/resource/file")));
        assert!(!is_authorized(&v, Action::ResourceDelete, &target("res://catalog/c/resource/file")));
    }

    #[test]
    fn admin_rule_expands_to_narrower_actions_under_the_same_prefix() {
        let v = view(
            Scope::catalog("c"),
            vec![Rule {
                intent: Intent::Allow,
                actions: vec![Action::CatalogAdmin],
                targets: vec!["res://catalog/c".to_string()],
            }],
        );
        assert!(is_authorized(&v, Action::ResourceDelete, &target("res://catalog/c/resource/file")));
        assert!(is_authorized(&v, Action::SkillsetUse, &target("res://catalog/c/skillset/tool")));
    }

    #[test]
    fn subset_check_rejects_a_broader_child_action() {
        let parent = view(
            Scope::catalog("c"),
            vec![Rule {
                intent: Intent::Allow,
                actions: vec![Action::ResourceRead],
                targets: vec!["resource/file".to_string()],
            }],
        );
        let child = view(
            Scope::catalog("c"),
            vec![Rule {
                intent: Intent::Allow,
                actions: vec![Action::ResourceDelete],
                targets: vec!["resource/file".to_string()],
            }],
        );
        assert!(!is_subset_of(&child, &parent));
    }

    #[test]
    fn validate_derived_view_requires_sub_scope_and_subset_rules() {
        let parent = view(
            Scope::catalog("c"),
            vec![Rule {
                intent: Intent::Allow,
                actions: vec![Action::ResourceRead],
                targets: vec!["variant/*/resource/*".to_string()],
            }],
        );
        let child_scope = Scope {
            catalog: "c".to_string(),
            variant: Some("v".to_string()),
            namespace: None,
        };
        let child = view(
            child_scope,
            vec![Rule {
                intent: Intent::Allow,
                actions: vec![Action::ResourceRead],
                targets: vec!["resource/file".to_string()],
            }],
        );
        assert!(validate_derived_view(&parent, &child));
    }
}
