// crates/tansive-server/src/session.rs
// ============================================================================
// Module: Session Manager
// Description: Session-spec validation and the new-session workflow.
// Purpose: Implement component 4.E SessionManager.newSession / getExecutionState.
// Dependencies: tansive-core, tansive-policy
// ============================================================================

//! ## Overview
//! Implements the `SessionManager.newSession` workflow (component 4.E):
//! validating the client-submitted [`SessionSpec`], snapshotting the
//! adopted view, checking the derivation and skillset-export policy gates,
//! and assembling the persisted [`Session`] record. Handler wiring (HTTP
//! parsing, PKCE issuance) lives in [`crate::routes`].

use serde_json::Value;
use tansive_core::core::Action;
use tansive_core::core::ApiError;
use tansive_core::core::CatalogId;
use tansive_core::core::TargetResource;
use tansive_core::core::TenantId;
use tansive_core::core::VariantId;
use tansive_core::core::View;
use tansive_core::core::resource::validate_name;
use tansive_core::core::session::split_skill_path;
use tansive_core::interfaces::SkillsetLookup;
use tansive_policy::canonicalize_target;
use tansive_policy::is_authorized;
use tansive_policy::validate_derived_view;

/// Prefix under which a skill's resource path is canonicalized for the
/// skillset-export policy gate.
const SKILLSET_RESOURCE_PREFIX: &str = "skillset";

/// Validates a session-scoped variables payload obeys the property-count
/// and key-pattern limits (component 4.E step 1).
///
/// # Errors
/// Returns [`ApiError`] (kind `Invalid`) when the payload is not a JSON
/// object, has more than `max_properties` keys, or a key fails the
/// `^[A-Za-z0-9.-]+$` pattern.
pub fn validate_session_variables(value: Option<&Value>, max_properties: u32) -> Result<(), ApiError> {
    let Some(value) = value else {
        return Ok(());
    };
    if matches!(value, Value::Null) {
        return Ok(());
    }
    let Value::Object(map) = value else {
        return Err(ApiError::invalid("session_variables must be a JSON object"));
    };
    if map.len() > max_properties as usize {
        return Err(ApiError::invalid(format!(
            "session_variables has {} properties, exceeding the limit of {max_properties}",
            map.len()
        )));
    }
    for key in map.keys() {
        if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-') || key.is_empty() {
            return Err(ApiError::invalid(format!("session_variables key '{key}' is not a valid identifier")));
        }
    }
    Ok(())
}

/// Validates a skill path is absolute and each segment follows the
/// resource-name grammar, returning `(skillset_path, skill)`.
///
/// # Errors
/// Returns [`ApiError`] (kind `Invalid`) when the path is not absolute, is
/// missing a skill segment, or any segment fails DNS-label validation.
pub fn validate_skill_path(skill_path: &str) -> Result<(String, String), ApiError> {
    let (skillset_path, skill) = split_skill_path(skill_path).map_err(|err| ApiError::invalid(err.to_string()))?;
    for segment in skillset_path.split('/').filter(|s| !s.is_empty()) {
        validate_name(segment).map_err(|err| ApiError::invalid(err.to_string()))?;
    }
    validate_name(&skill).map_err(|err| ApiError::invalid(err.to_string()))?;
    Ok((skillset_path, skill))
}

/// Builds the canonical resource path for a skill's skillset, used as the
/// target of the skillset-export policy gate (component 4.E step 6).
#[must_use]
pub fn skillset_resource_target(
    view: &tansive_core::core::ViewDefinition,
    skillset_path: &str,
    skill: &str,
) -> Result<TargetResource, ApiError> {
    let relative = if skillset_path == "/" {
        format!("{SKILLSET_RESOURCE_PREFIX}/{skill}")
    } else {
        format!("{SKILLSET_RESOURCE_PREFIX}{skillset_path}/{skill}")
    };
    canonicalize_target(&view.scope, &relative).map_err(|err| ApiError::invalid(err.to_string()))
}

/// Checks that every action the skill exports is permitted on its skillset
/// resource path under `target_view` (component 4.E step 6).
///
/// # Errors
/// Returns [`ApiError`] (kind `DisallowedByPolicy`) when any exported
/// action is denied.
pub fn enforce_skillset_export_policy(
    target_view: &tansive_core::core::ViewDefinition,
    target: &TargetResource,
    exported_actions: &[Action],
) -> Result<(), ApiError> {
    for action in exported_actions {
        if !is_authorized(target_view, *action, target) {
            return Err(ApiError::disallowed_by_policy(format!(
                "skill export '{}' is not permitted under the adopted view",
                action.as_str()
            )));
        }
    }
    Ok(())
}

/// Loads a skill's exported actions and validates them against the
/// skillset-export policy gate in one step.
///
/// # Errors
/// Propagates [`ApiError`] from lookup failure or policy denial.
pub fn check_skillset_export<L: SkillsetLookup>(
    lookup: &L,
    tenant_id: &TenantId,
    target_view: &tansive_core::core::ViewDefinition,
    skillset_path: &str,
    skill: &str,
) -> Result<(), ApiError> {
    let exported = lookup
        .exported_actions(tenant_id, skillset_path, skill)
        .map_err(|err| ApiError::internal("skillset lookup failed").with_cause(err))?;
    let target = skillset_resource_target(target_view, skillset_path, skill)?;
    enforce_skillset_export_policy(target_view, &target, &exported)
}

/// Checks that `target_view` is a valid derivation of `current_view`
/// (component 4.D `validateDerivedView`, component 4.E step 5).
///
/// # Errors
/// Returns [`ApiError`] (kind `DisallowedByPolicy`) when the derivation
/// check fails.
pub fn require_derived_view(
    current_view: &tansive_core::core::ViewDefinition,
    target_view: &tansive_core::core::ViewDefinition,
) -> Result<(), ApiError> {
    if validate_derived_view(current_view, target_view) {
        Ok(())
    } else {
        Err(ApiError::disallowed_by_policy("requested view is not a derivation of the adopted view"))
    }
}

/// The resolved, validated inputs a new session is built from, after
/// derivation and skillset-export checks have already passed.
pub struct NewSessionInputs<'a> {
    /// The tenant creating the session.
    pub tenant_id: &'a TenantId,
    /// The catalog the session runs under.
    pub catalog_id: CatalogId,
    /// The variant the session runs under.
    pub variant_id: VariantId,
    /// The authenticated user creating the session.
    pub user_id: &'a str,
    /// The view record the session adopts.
    pub target_view: &'a View,
    /// Directory portion of the skill path.
    pub skillset_path: String,
    /// Base portion of the skill path.
    pub skill: String,
    /// Caller-supplied session variables, already validated.
    pub variables: Value,
    /// Caller-supplied input arguments.
    pub input_args: Value,
}
