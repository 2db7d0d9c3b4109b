// crates/tansive-policy/src/matcher.rs
// ============================================================================
// Module: Tansive Policy Matcher
// Description: Segment-based resource matching and rule-target canonicalization.
// Purpose: Provide the primitive wildcard/prefix comparisons the policy engine builds on.
// Dependencies: tansive-core
// ============================================================================

//! ## Overview
//! Matching is purely segment-based: a rule target and an actual resource
//! are each split on `/` and compared position by position. A concrete rule
//! segment can never authorize a wildcard-spanning request segment, but a
//! wildcard rule segment matches anything. This module has no notion of
//! allow/deny or admin expansion; that lives in [`crate::engine`].

use tansive_core::core::Scope;
use tansive_core::core::TargetResource;
use tansive_core::core::resource::RESOURCE_SCHEME;
use tansive_core::core::resource::TargetResourceError;
use tansive_core::core::resource::scope_resource_path;

/// Errors raised while canonicalizing a rule target against a view's scope.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatcherError {
    /// The canonicalized target string failed to parse as a resource URI.
    #[error(transparent)]
    Target(#[from] TargetResourceError),
}

/// Returns `true` when `rule` matches `actual` per the segment algorithm:
/// `rule` may be shorter than `actual` only if its last segment is `*`; a
/// wildcard rule segment matches anything, a concrete rule segment never
/// matches a wildcard actual segment, and all other segments must be equal.
#[must_use]
pub fn segments_match(rule: &[String], actual: &[String]) -> bool {
    if rule.len() > actual.len() {
        return false;
    }
    if rule.len() < actual.len() && rule.last().map(String::as_str) != Some("*") {
        return false;
    }
    for (rule_segment, actual_segment) in rule.iter().zip(actual.iter()) {
        if actual_segment == "*" && rule_segment != "*" {
            return false;
        }
        if rule_segment == "*" {
            continue;
        }
        if rule_segment != actual_segment {
            return false;
        }
    }
    true
}

/// Returns `true` when every segment of `shorter` equals the corresponding
/// segment of `longer`, in order, with `shorter.len() <= longer.len()`.
#[must_use]
pub fn is_prefix(shorter: &[String], longer: &[String]) -> bool {
    shorter.len() <= longer.len() && shorter.iter().zip(longer.iter()).all(|(a, b)| a == b)
}

/// Returns `true` when `rule_target`'s second-to-last segment equals `kind`,
/// marking it as an admin-expansion target for that scope-prefix kind.
#[must_use]
pub fn admin_match(rule_target: &[String], kind: &str) -> bool {
    rule_target.len() >= 2 && rule_target[rule_target.len() - 2] == kind
}

/// Canonicalizes a rule-authored target string against `scope`: an already
/// absolute `res://…` string is parsed as-is; anything else is treated as
/// relative to the scope's own resource path.
///
/// # Errors
/// Returns [`MatcherError`] when the resulting string does not parse as a
/// target resource URI.
pub fn canonicalize_target(scope: &Scope, raw: &str) -> Result<TargetResource, MatcherError> {
    if raw.starts_with(RESOURCE_SCHEME) {
        return Ok(TargetResource::parse(raw)?);
    }
    let absolute = format!("{}/{}", scope_resource_path(scope), raw.trim_start_matches('/'));
    Ok(TargetResource::parse(&absolute)?)
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

    fn segs(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn exact_match() {
        assert!(segments_match(&segs(&["a", "b"]), &segs(&["a", "b"])));
    }

    #[test]
    fn trailing_wildcard_spans_suffix() {
        assert!(segments_match(&segs(&["a", "*"]), &segs(&["a", "b", "c"])));
    }

    #[test]
    fn concrete_rule_never_matches_wildcard_actual_segment() {
        assert!(!segments_match(&segs(&["a", "b"]), &segs(&["a", "*"])));
    }

    #[test]
    fn wildcard_rule_segment_matches_any_actual_segment_including_wildcard() {
        assert!(segments_match(&segs(&["a", "*"]), &segs(&["a", "*"])));
    }

    #[test]
    fn shorter_rule_without_trailing_wildcard_does_not_match() {
        assert!(!segments_match(&segs(&["a"]), &segs(&["a", "b"])));
    }

    #[test]
    fn longer_rule_never_matches_shorter_actual() {
        assert!(!segments_match(&segs(&["a", "b"]), &segs(&["a"])));
    }

    #[test]
    fn admin_match_checks_second_to_last_segment() {
        assert!(admin_match(&segs(&["catalog", "c"]), "catalog"));
        assert!(!admin_match(&segs(&["catalog", "c"]), "variant"));
        assert!(!admin_match(&segs(&["c"]), "catalog"));
    }

    #[test]
    fn canonicalize_target_passes_absolute_uris_through() {
        let scope = Scope::catalog("c");
        let target = canonicalize_target(&scope, "res://catalog/other").unwrap();
        assert_eq!(target.segments(), ["catalog", "other"]);
    }

    #[test]
    fn canonicalize_target_prefixes_relative_targets_with_scope() {
        let scope = Scope::catalog("c");
        let target = canonicalize_target(&scope, "resource/myfile").unwrap();
        assert_eq!(target.segments(), ["catalog", "c", "resource", "myfile"]);
    }
}
