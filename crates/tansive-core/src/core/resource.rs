// crates/tansive-core/src/core/resource.rs
// ============================================================================
// Module: Tansive Resource Scope & URI
// Description: Scope triples, target-resource URIs, and DNS-label name validation.
// Purpose: Provide the shared vocabulary the policy engine and request pipeline match against.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`Scope`] is the `(catalog, variant?, namespace?)` triple that every
//! catalog object lives under. A [`TargetResource`] is the `res://…` string
//! naming the object of a policy decision. Names embedded in both follow
//! DNS-label rules (lowercase alphanumeric plus hyphen, 1-63 chars, no
//! leading/trailing hyphen).
//!
//! This module only models the shape of these values; matching semantics
//! (wildcards, admin expansion, subset checks) live in the policy engine.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

// ============================================================================
// SECTION: Name Validation
// ============================================================================

/// Maximum length of a single DNS-label-style name segment.
pub const MAX_NAME_LENGTH: usize = 63;

/// Validates a single name segment against DNS-label rules.
///
/// # Errors
/// Returns [`NameError`] when the name is empty, too long, contains
/// characters outside `[a-z0-9-]`, or has a leading/trailing hyphen.
pub fn validate_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(NameError::TooLong(name.len()));
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(NameError::LeadingOrTrailingHyphen);
    }
    if !name.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-') {
        return Err(NameError::InvalidCharacter);
    }
    Ok(())
}

/// Errors returned when validating a resource name segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NameError {
    /// Name was empty.
    #[error("resource name must not be empty")]
    Empty,
    /// Name exceeded [`MAX_NAME_LENGTH`].
    #[error("resource name exceeds {MAX_NAME_LENGTH} characters (got {0})")]
    TooLong(usize),
    /// Name started or ended with a hyphen.
    #[error("resource name must not start or end with a hyphen")]
    LeadingOrTrailingHyphen,
    /// Name contained a character outside `[a-z0-9-]`.
    #[error("resource name must contain only lowercase alphanumerics and hyphens")]
    InvalidCharacter,
}

// ============================================================================
// SECTION: Scope
// ============================================================================

/// A `(catalog, variant?, namespace?)` triple.
///
/// # Invariants
/// - `variant` is only meaningful when `catalog` is set; `namespace` only
///   when `variant` is set. Construction does not enforce this — callers
///   populating a scope from request context are responsible for respecting
///   the hierarchy.
/// - Two scopes are equal iff all three fields match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Scope {
    /// Catalog name; always required for a meaningful scope.
    pub catalog: String,
    /// Variant name, meaningful only when `catalog` is set.
    pub variant: Option<String>,
    /// Namespace name, meaningful only when `variant` is set.
    pub namespace: Option<String>,
}

impl Scope {
    /// Builds a catalog-only scope.
    #[must_use]
    pub fn catalog(catalog: impl Into<String>) -> Self {
        Self {
            catalog: catalog.into(),
            variant: None,
            namespace: None,
        }
    }

    /// Returns `true` when `self` is equal to or a sub-scope of `parent`:
    /// every non-empty field of `parent` must match the same field in
    /// `self`, and `self` may additionally specialize fields left `None` in
    /// `parent`.
    #[must_use]
    pub fn is_sub_scope_of(&self, parent: &Scope) -> bool {
        if parent.catalog != "*" && parent.catalog != self.catalog {
            return false;
        }
        if let Some(parent_variant) = &parent.variant {
            match &self.variant {
                Some(variant) if variant == parent_variant => {}
                _ => return false,
            }
        }
        if let Some(parent_namespace) = &parent.namespace {
            match &self.namespace {
                Some(namespace) if namespace == parent_namespace => {}
                _ => return false,
            }
        }
        true
    }
}

// ============================================================================
// SECTION: Target Resource URI
// ============================================================================

/// A parsed `res://…` target resource URI.
///
/// # Invariants
/// - `segments` is non-empty.
/// - The last segment may be `"*"`, meaning "any remaining suffix"; no other
///   segment may contain a bare `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetResource {
    segments: Vec<String>,
}

/// URI scheme required by every target resource.
pub const RESOURCE_SCHEME: &str = "res://";

impl TargetResource {
    /// Parses a `res://…` URI into its `/`-delimited segments.
    ///
    /// # Errors
    /// Returns [`TargetResourceError::MissingScheme`] when the input does not
    /// start with `res://`, or [`TargetResourceError::Empty`] when no
    /// segments follow the scheme.
    pub fn parse(uri: &str) -> Result<Self, TargetResourceError> {
        let rest = uri
            .strip_prefix(RESOURCE_SCHEME)
            .ok_or_else(|| TargetResourceError::MissingScheme(uri.to_string()))?;
        let segments: Vec<String> =
            rest.split('/').filter(|segment| !segment.is_empty()).map(str::to_string).collect();
        if segments.is_empty() {
            return Err(TargetResourceError::Empty);
        }
        Ok(Self { segments })
    }

    /// Builds a target resource directly from already-split segments,
    /// without the `res://` prefix.
    #[must_use]
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Returns the `/`-delimited segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for TargetResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{RESOURCE_SCHEME}{}", self.segments.join("/"))
    }
}

/// Errors returned when parsing a target resource URI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetResourceError {
    /// Input did not start with `res://`.
    #[error("target resource '{0}' is missing the 'res://' scheme")]
    MissingScheme(String),
    /// Input had no segments after the scheme.
    #[error("target resource has no segments after the 'res://' scheme")]
    Empty,
}

/// Returns the canonical `res://catalog/<name>[/variant/<name>[/namespace/<name>]]`
/// prefix for a scope.
#[must_use]
pub fn scope_resource_path(scope: &Scope) -> String {
    let mut path = format!("{RESOURCE_SCHEME}catalog/{}", scope.catalog);
    if let Some(variant) = &scope.variant {
        path.push_str(&format!("/variant/{variant}"));
        if let Some(namespace) = &scope.namespace {
            path.push_str(&format!("/namespace/{namespace}"));
        }
    }
    path
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
    fn validate_name_rejects_bad_segments() {
        assert!(validate_name("my-resource").is_ok());
        assert_eq!(validate_name(""), Err(NameError::Empty));
        assert_eq!(validate_name("-bad"), Err(NameError::LeadingOrTrailingHyphen));
        assert_eq!(validate_name("bad-"), Err(NameError::LeadingOrTrailingHyphen));
        assert_eq!(validate_name("Bad"), Err(NameError::InvalidCharacter));
        assert_eq!(validate_name(&"a".repeat(64)), Err(NameError::TooLong(64)));
    }

    #[test]
    fn target_resource_parses_segments() {
        let target = TargetResource::parse("res://catalog/c/variant/v/resource/*").unwrap();
        assert_eq!(
            target.segments(),
            ["catalog", "c", "variant", "v", "resource", "*"]
        );
    }

    #[test]
    fn target_resource_requires_scheme() {
        assert!(matches!(
            TargetResource::parse("catalog/c"),
            Err(TargetResourceError::MissingScheme(_))
        ));
    }

    #[test]
    fn scope_sub_scope_allows_specialization() {
        let parent = Scope::catalog("c");
        let child = Scope {
            catalog: "c".to_string(),
            variant: Some("v".to_string()),
            namespace: None,
        };
        assert!(child.is_sub_scope_of(&parent));
        assert!(!parent.is_sub_scope_of(&child));
    }

    #[test]
    fn scope_resource_path_matches_expected_prefix() {
        let scope = Scope {
            catalog: "c".to_string(),
            variant: Some("v".to_string()),
            namespace: Some("n".to_string()),
        };
        assert_eq!(scope_resource_path(&scope), "res://catalog/c/variant/v/namespace/n");
    }
}
