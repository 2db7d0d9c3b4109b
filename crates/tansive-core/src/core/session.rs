// crates/tansive-core/src/core/session.rs
// ============================================================================
// Module: Tansive Sessions
// Description: Session spec parsing and the persisted Session record.
// Purpose: Model a bounded execution of a skill under a snapshotted view.
// Dependencies: crate::core::identifiers, crate::core::rule, serde, time
// ============================================================================

//! ## Overview
//! A [`Session`] is created from a client-submitted [`SessionSpec`] plus
//! request context; its [`ViewDefinition`] is snapshotted at creation time so
//! later edits to the adopted view do not retroactively change an in-flight
//! session's authority (testable property P9).

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

use crate::core::identifiers::CatalogId;
use crate::core::identifiers::SessionId;
use crate::core::identifiers::VariantId;
use crate::core::identifiers::ViewId;
use crate::core::rule::ViewDefinition;

/// Client-submitted request to create a session.
///
/// # Invariants
/// - `skill_path` and `view_name` are validated against the resource-path /
///   resource-name grammar by the session manager before use, not by this
///   type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSpec {
    /// Absolute path to the skill to invoke, e.g. `/tools/deploy`.
    pub skill_path: String,
    /// Label of the view to adopt for this session.
    pub view_name: String,
    /// Caller-supplied session-scoped variables, subject to a property-count
    /// and key-pattern limit enforced by the session manager.
    #[serde(default)]
    pub session_variables: Option<Value>,
    /// Caller-supplied input arguments, passed through to the skill
    /// unvalidated by the session manager.
    #[serde(default)]
    pub input_args: Option<Value>,
}

/// The in-band status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Session created but not yet claimed by a worker.
    Created,
    /// Session claimed and executing.
    Running,
    /// Session finished successfully.
    Completed,
    /// Session finished with an error.
    Failed,
    /// Session's TTL elapsed before completion.
    Expired,
    /// Session was cancelled by its owner.
    Cancelled,
    /// Session execution is paused.
    Paused,
    /// Session execution was resumed after a pause.
    Resumed,
    /// Session execution is suspended pending external input.
    Suspended,
    /// Session was terminated by an operator.
    Terminated,
}

/// A persisted session record.
///
/// # Invariants
/// - `view_definition_snapshot` never changes after creation, even if the
///   adopted view is later edited or deleted.
/// - `status_summary` is the only field mutated in place during execution
///   (via `SessionManager::set_status_summary`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The session's identifier.
    pub session_id: SessionId,
    /// Directory portion of the skill path (the skillset).
    pub skillset_path: String,
    /// Base portion of the skill path (the skill name).
    pub skill: String,
    /// The view adopted for this session.
    pub view_id: ViewId,
    /// The view definition as it existed at session-creation time.
    pub view_definition_snapshot: ViewDefinition,
    /// Session-scoped variables supplied at creation.
    pub variables: Value,
    /// Input arguments supplied at creation.
    pub input_args: Value,
    /// The current in-band status.
    pub status_summary: SessionStatus,
    /// The user who created this session.
    pub user_id: String,
    /// The catalog this session runs under.
    pub catalog_id: CatalogId,
    /// The variant this session runs under.
    pub variant_id: VariantId,
    /// When the session was created.
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    /// When the session reached a terminal state, if it has.
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
    /// When the session expires if still unclaimed/incomplete.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// The snapshot a worker needs to execute a session's skill; the only
/// authority a worker is given, delivered only in response to a
/// session-scoped token produced by PKCE code exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionState {
    /// The session's identifier.
    pub session_id: SessionId,
    /// Directory portion of the skill path.
    pub skillset_path: String,
    /// Base portion of the skill path.
    pub skill: String,
    /// The view definition snapshotted at session creation.
    pub view_definition: ViewDefinition,
    /// Session-scoped variables.
    pub variables: Value,
    /// Input arguments.
    pub input_args: Value,
    /// The tenant this session belongs to.
    pub tenant_id: String,
}

/// Splits an absolute skill path (`/dir/.../skill`) into `(skillset_path,
/// skill)`.
///
/// # Errors
/// Returns [`SkillPathError`] when `path` does not start with `/` or has no
/// skill segment after the final `/`.
pub fn split_skill_path(path: &str) -> Result<(String, String), SkillPathError> {
    if !path.starts_with('/') {
        return Err(SkillPathError::NotAbsolute);
    }
    let (dir, base) = path.rsplit_once('/').unwrap_or(("", path));
    if base.is_empty() {
        return Err(SkillPathError::MissingSkill);
    }
    let skillset_path = if dir.is_empty() { "/".to_string() } else { dir.to_string() };
    Ok((skillset_path, base.to_string()))
}

/// Errors returned when splitting a skill path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SkillPathError {
    /// Path did not start with `/`.
    #[error("skill path must be absolute (start with '/')")]
    NotAbsolute,
    /// Path had no skill segment.
    #[error("skill path must name a skill after the final '/'")]
    MissingSkill,
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
    fn split_skill_path_separates_dir_and_skill() {
        let (skillset, skill) = split_skill_path("/tools/deploy").unwrap();
        assert_eq!(skillset, "/tools");
        assert_eq!(skill, "deploy");
    }

    #[test]
    fn split_skill_path_handles_top_level_skill() {
        let (skillset, skill) = split_skill_path("/deploy").unwrap();
        assert_eq!(skillset, "/");
        assert_eq!(skill, "deploy");
    }

    #[test]
    fn split_skill_path_rejects_relative_paths() {
        assert_eq!(split_skill_path("deploy"), Err(SkillPathError::NotAbsolute));
    }

    #[test]
    fn split_skill_path_rejects_trailing_slash() {
        assert_eq!(split_skill_path("/tools/"), Err(SkillPathError::MissingSkill));
    }
}
