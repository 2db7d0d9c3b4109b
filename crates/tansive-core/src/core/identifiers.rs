// crates/tansive-core/src/core/identifiers.rs
// ============================================================================
// Module: Tansive Identifiers
// Description: Canonical opaque identifiers for tenants, projects, and catalog objects.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde, uuid
// ============================================================================

//! ## Overview
//! This module defines the canonical identifiers used throughout Tansive.
//! Tenants and projects use opaque, prefixed alphanumeric strings; every other
//! catalog object (catalog, variant, namespace, view, session, signing key)
//! uses a time-ordered UUIDv7 so that ordering by ID approximates creation
//! order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

// ============================================================================
// SECTION: Prefixed String Identifiers
// ============================================================================

/// Error returned when a prefixed identifier fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("identifier '{value}' does not have the required '{prefix}' prefix")]
pub struct PrefixedIdError {
    /// The offending raw value.
    value: String,
    /// The prefix that was required.
    prefix: char,
}

/// Tenant identifier: an opaque string prefixed with `T`.
///
/// # Invariants
/// - Always starts with `T` followed by at least one alphanumeric character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

/// Project identifier: an opaque string prefixed with `P`.
///
/// # Invariants
/// - Always starts with `P` followed by at least one alphanumeric character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

macro_rules! prefixed_string_id {
    ($name:ident, $prefix:expr) => {
        impl $name {
            /// Validates and wraps a raw prefixed identifier string.
            ///
            /// # Errors
            /// Returns [`PrefixedIdError`] when the value does not start with
            /// the required prefix followed by at least one alphanumeric
            /// character.
            pub fn new(value: impl Into<String>) -> Result<Self, PrefixedIdError> {
                let value = value.into();
                let mut chars = value.chars();
                let ok = chars.next() == Some($prefix)
                    && chars.clone().next().is_some()
                    && chars.all(|c| c.is_ascii_alphanumeric());
                if ok {
                    Ok(Self(value))
                } else {
                    Err(PrefixedIdError {
                        value,
                        prefix: $prefix,
                    })
                }
            }

            /// Returns the raw string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = PrefixedIdError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<String> for $name {
            type Error = PrefixedIdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

prefixed_string_id!(TenantId, 'T');
prefixed_string_id!(ProjectId, 'P');

// ============================================================================
// SECTION: UUID Identifiers
// ============================================================================

/// Generates a macro-defined UUIDv7 newtype identifier.
///
/// Every such identifier serializes as its canonical hyphenated UUID string
/// form and exposes `new`/`from_uuid`/`get` accessors.
macro_rules! uuid_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        ///
        /// # Invariants
        /// - Wraps a version-7 (time-ordered) UUID once minted by [`Self::new`];
        ///   values constructed via [`Self::from_uuid`] (e.g. parsed from
        ///   storage or the wire) are not re-validated for version.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mints a new, time-ordered identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wraps an existing UUID value (e.g. loaded from storage).
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID value.
            #[must_use]
            pub const fn get(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

uuid_id!(CatalogId, "Catalog identifier.");
uuid_id!(VariantId, "Variant identifier.");
uuid_id!(NamespaceId, "Namespace identifier.");
uuid_id!(ViewId, "View identifier.");
uuid_id!(SessionId, "Session identifier.");
uuid_id!(SigningKeyId, "Signing key identifier.");

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
    fn tenant_id_requires_prefix_and_body() {
        assert!(TenantId::new("T1").is_ok());
        assert!(TenantId::new("T").is_err());
        assert!(TenantId::new("P1").is_err());
        assert!(TenantId::new("t1").is_err());
    }

    #[test]
    fn project_id_roundtrips_through_display() {
        let id = ProjectId::new("Pabc123").expect("valid project id");
        assert_eq!(id.as_str(), "Pabc123");
        assert_eq!(id.to_string(), "Pabc123");
    }

    #[test]
    fn uuid_ids_are_distinct_and_time_ordered_by_construction() {
        let a = ViewId::new();
        let b = ViewId::new();
        assert_ne!(a, b);
        assert_eq!(a.get().get_version_num(), 7);
    }

    #[test]
    fn uuid_id_roundtrips_through_string() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().expect("parses back");
        assert_eq!(id, parsed);
    }
}
