// crates/tansive-core/src/core/errors.rs
// ============================================================================
// Module: Tansive API Error Hierarchy
// Description: The tagged ApiError hierarchy with attached HTTP status codes.
// Purpose: Give every component a shared vocabulary for propagating failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every component returns an [`ApiError`] carrying one of the fixed `Kind`s
//! below. The outermost HTTP layer converts an `ApiError` into `{result: 0,
//! error: <description>}` at the attached status code. The `description`
//! surfaced to callers never includes internal identifiers or causes; those
//! are available only via [`std::error::Error::source`] for operator logs.

use std::fmt;

use thiserror::Error;

/// The fixed set of error kinds, each mapped to a stable HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Malformed JSON, schema-validation failures, missing required IDs, bad UUIDs.
    Invalid,
    /// Missing/invalid/expired token, signature failure, missing required claims.
    Unauthorized,
    /// Derivation failure, denied action.
    DisallowedByPolicy,
    /// Catalog/variant/view/session/namespace absent.
    NotFound,
    /// Already-exists on create.
    Conflict,
    /// Key generation/encryption failure, DB errors, schema-compile failures at startup.
    Internal,
    /// Database not reachable at `/ready`.
    Unavailable,
}

impl Kind {
    /// Returns the HTTP status code associated with this kind.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Invalid => 400,
            Self::Unauthorized => 401,
            Self::DisallowedByPolicy => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Internal => 500,
            Self::Unavailable => 503,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Invalid => "invalid_request",
            Self::Unauthorized => "unauthorized",
            Self::DisallowedByPolicy => "disallowed_by_policy",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
            Self::Unavailable => "unavailable",
        };
        f.write_str(label)
    }
}

/// A domain error carrying a [`Kind`], a stable user-facing description, and
/// an optional wrapped cause for operator logs.
///
/// # Invariants
/// - `description` never includes internal identifiers (DB keys, file
///   paths, stack traces); those belong only in the wrapped `source`.
#[derive(Debug, Error)]
#[error("{kind}: {description}")]
pub struct ApiError {
    kind: Kind,
    description: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ApiError {
    /// Builds a new error of `kind` with a user-facing `description`.
    pub fn new(kind: Kind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            source: None,
        }
    }

    /// Attaches a wrapped cause, retained for operator logs only.
    #[must_use]
    pub fn with_cause(
        mut self,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(cause));
        self
    }

    /// Returns this error's kind.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// Returns the stable, user-facing description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Builds an [`Kind::Invalid`] error.
    #[must_use]
    pub fn invalid(description: impl Into<String>) -> Self {
        Self::new(Kind::Invalid, description)
    }

    /// Builds an [`Kind::Unauthorized`] error.
    #[must_use]
    pub fn unauthorized(description: impl Into<String>) -> Self {
        Self::new(Kind::Unauthorized, description)
    }

    /// Builds a [`Kind::DisallowedByPolicy`] error.
    #[must_use]
    pub fn disallowed_by_policy(description: impl Into<String>) -> Self {
        Self::new(Kind::DisallowedByPolicy, description)
    }

    /// Builds a [`Kind::NotFound`] error.
    #[must_use]
    pub fn not_found(description: impl Into<String>) -> Self {
        Self::new(Kind::NotFound, description)
    }

    /// Builds a [`Kind::Conflict`] error.
    #[must_use]
    pub fn conflict(description: impl Into<String>) -> Self {
        Self::new(Kind::Conflict, description)
    }

    /// Builds a [`Kind::Internal`] error.
    #[must_use]
    pub fn internal(description: impl Into<String>) -> Self {
        Self::new(Kind::Internal, description)
    }

    /// Builds a [`Kind::Unavailable`] error.
    #[must_use]
    pub fn unavailable(description: impl Into<String>) -> Self {
        Self::new(Kind::Unavailable, description)
    }
}

/// The wire shape of an error response: `{result: 0, error: <description>}`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ErrorResponse {
    /// Always `0` on an error response.
    pub result: u8,
    /// The stable, user-facing description.
    pub error: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(error: &ApiError) -> Self {
        Self {
            result: 0,
            error: error.description().to_string(),
        }
    }
}
