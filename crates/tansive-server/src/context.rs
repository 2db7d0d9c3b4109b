// crates/tansive-server/src/context.rs
// ============================================================================
// Module: Request Context Pipeline
// Description: Authentication, catalog-context loading, and policy enforcement.
// Purpose: Implement component 4.F steps 3-5.
// Dependencies: axum, tansive-core, tansive-token, tansive-policy
// ============================================================================

//! ## Overview
//! This module implements the authenticated portion of the request context
//! pipeline (component 4.F): step 3 (bearer-token authentication), step 4
//! (catalog-context loading, precedence URL param > query param > body
//! metadata > view scope), and step 5 (policy enforcement against the
//! authenticated view). Step 1 (correlation) lives in [`crate::correlation`];
//! step 2 (database scoping) is trivial here since [`tansive_store_sqlite::SqliteStore`]
//! is a single shared, internally synchronized connection rather than a pool
//! requiring per-request checkout.
//!
//! Tenant resolution precedes token validation (a token is verified against
//! its tenant's signing key): callers supply the tenant via the
//! [`TENANT_HEADER`] header, or in single-user mode fall back to
//! `config.default_tenant_id`.

use axum::http::HeaderMap;
use tansive_core::core::Action;
use tansive_core::core::ApiError;
use tansive_core::core::CatalogContext;
use tansive_core::core::CatalogId;
use tansive_core::core::NamespaceId;
use tansive_core::core::Subject;
use tansive_core::core::TargetResource;
use tansive_core::core::TenantId;
use tansive_core::core::VariantId;
use tansive_core::interfaces::CatalogNameResolver;
use tansive_token::SUBJECT_SESSION_PREFIX;
use tansive_token::SUBJECT_USER_PREFIX;
use tansive_token::Token;

/// Header carrying the caller's tenant identifier.
pub const TENANT_HEADER: &str = "x-tansive-tenant";
/// Query parameter alias for `catalog`.
pub const CATALOG_QUERY_PARAM: &str = "c";
/// Query parameter alias for `variant`.
pub const VARIANT_QUERY_PARAM: &str = "v";
/// Query parameter alias for `namespace`.
pub const NAMESPACE_QUERY_PARAM: &str = "n";

// ============================================================================
// SECTION: Step 3 — Authentication
// ============================================================================

/// Extracts the bearer token string from the `Authorization` header.
///
/// # Errors
/// Returns [`ApiError`] (kind `Unauthorized`) when the header is missing,
/// empty, or not in `Bearer <token>` form.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("missing Authorization header"))?
        .to_str()
        .map_err(|_| ApiError::unauthorized("Authorization header is not valid UTF-8"))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Authorization header must use the Bearer scheme"))?
        .trim();
    if token.is_empty() {
        return Err(ApiError::unauthorized("bearer token is empty"));
    }
    Ok(token)
}

/// Resolves the caller's tenant from [`TENANT_HEADER`], falling back to
/// `default_tenant_id` only when `single_user_mode` is enabled.
///
/// # Errors
/// Returns [`ApiError`] (kind `Unauthorized`) when no tenant can be
/// determined, or (kind `Invalid`) when the header value is malformed.
pub fn resolve_tenant_id(
    headers: &HeaderMap,
    single_user_mode: bool,
    default_tenant_id: Option<&TenantId>,
) -> Result<TenantId, ApiError> {
    if let Some(value) = headers.get(TENANT_HEADER) {
        let raw = value.to_str().map_err(|_| ApiError::invalid("tenant header is not valid UTF-8"))?;
        return TenantId::new(raw).map_err(|err| ApiError::invalid(err.to_string()));
    }
    if single_user_mode {
        if let Some(tenant_id) = default_tenant_id {
            return Ok(tenant_id.clone());
        }
    }
    Err(ApiError::unauthorized("no tenant could be determined for this request"))
}

/// Builds the request-scoped [`CatalogContext`] from a validated token
/// (component 4.F step 3 claim-to-context mapping).
///
/// # Errors
/// Returns [`ApiError`] (kind `Unauthorized`) when the token's `sub` claim
/// names a session but is not a parseable session ID.
pub fn catalog_context_from_token(token: &Token) -> Result<CatalogContext, ApiError> {
    let subject = match token.subject() {
        Some(sub) if sub.starts_with(SUBJECT_USER_PREFIX) => Subject::User {
            user_id: sub[SUBJECT_USER_PREFIX.len()..].to_string(),
        },
        Some(sub) if sub.starts_with(SUBJECT_SESSION_PREFIX) => {
            let raw = &sub[SUBJECT_SESSION_PREFIX.len()..];
            let session_id = raw
                .parse()
                .map_err(|_| ApiError::unauthorized("session-bound token has an unparseable session id"))?;
            Subject::Session { session_id }
        }
        _ => return Err(ApiError::unauthorized("token is missing a recognized subject claim")),
    };

    Ok(CatalogContext::new(token.tenant_id().clone(), subject).with_view_definition(token.view().clone()))
}

// ============================================================================
// SECTION: Step 4 — Catalog-Context Loading
// ============================================================================

/// Name overrides drawn from the URL path, in precedence order ahead of
/// query parameters and body metadata.
#[derive(Debug, Clone, Default)]
pub struct PathNameOverrides<'a> {
    /// Catalog name from an explicit URL path segment.
    pub catalog: Option<&'a str>,
    /// Variant name from an explicit URL path segment.
    pub variant: Option<&'a str>,
    /// Namespace name from an explicit URL path segment.
    pub namespace: Option<&'a str>,
}

/// Name overrides drawn from query parameters (`?c=&v=&n=`) or request-body
/// metadata, in precedence order behind the URL path but ahead of the
/// view's own scope.
#[derive(Debug, Clone, Default)]
pub struct FallbackNameOverrides {
    /// Catalog name from a query parameter or body metadata field.
    pub catalog: Option<String>,
    /// Variant name from a query parameter or body metadata field.
    pub variant: Option<String>,
    /// Namespace name from a query parameter or body metadata field.
    pub namespace: Option<String>,
}

/// Resolves and fills in `catalog_id`/`variant_id`/`namespace_id` on `ctx`,
/// honoring the precedence URL param > query/body metadata > view scope.
/// Fields already present on `ctx` are left untouched.
///
/// # Errors
/// Returns [`ApiError`] (kind `NotFound`) when a named object does not
/// resolve, or whatever error the resolver itself returns (mapped to
/// `Internal`/`Unavailable` as appropriate).
pub fn load_catalog_context<R: CatalogNameResolver>(
    resolver: &R,
    mut ctx: CatalogContext,
    path: &PathNameOverrides<'_>,
    fallback: &FallbackNameOverrides,
) -> Result<CatalogContext, ApiError> {
    let view_scope = ctx.view_definition.as_ref().map(|view| view.scope.clone());

    if ctx.catalog_id.is_none() {
        let name = path
            .catalog
            .map(str::to_string)
            .or_else(|| fallback.catalog.clone())
            .or_else(|| view_scope.as_ref().map(|scope| scope.catalog.clone()));
        if let Some(name) = name {
            let catalog_id = resolver
                .resolve_catalog(&ctx.tenant_id, &name)
                .map_err(|err| ApiError::internal("failed to resolve catalog name").with_cause(err))?
                .ok_or_else(|| ApiError::not_found(format!("catalog '{name}' not found")))?;
            ctx = ctx.with_catalog_id(catalog_id);
        }
    }

    if ctx.variant_id.is_none() {
        let name = path
            .variant
            .map(str::to_string)
            .or_else(|| fallback.variant.clone())
            .or_else(|| view_scope.as_ref().and_then(|scope| scope.variant.clone()));
        if let (Some(name), Some(catalog_id)) = (name, ctx.catalog_id) {
            let variant_id = resolver
                .resolve_variant(&ctx.tenant_id, &catalog_id, &name)
                .map_err(|err| ApiError::internal("failed to resolve variant name").with_cause(err))?
                .ok_or_else(|| ApiError::not_found(format!("variant '{name}' not found")))?;
            ctx = ctx.with_variant_id(variant_id);
        }
    }

    if ctx.namespace_id.is_none() {
        let name = path
            .namespace
            .map(str::to_string)
            .or_else(|| fallback.namespace.clone())
            .or_else(|| view_scope.as_ref().and_then(|scope| scope.namespace.clone()));
        if let (Some(name), Some(variant_id)) = (name, ctx.variant_id) {
            let namespace_id = resolver
                .resolve_namespace(&ctx.tenant_id, &variant_id, &name)
                .map_err(|err| ApiError::internal("failed to resolve namespace name").with_cause(err))?
                .ok_or_else(|| ApiError::not_found(format!("namespace '{name}' not found")))?;
            ctx = ctx.with_namespace_id(namespace_id);
        }
    }

    Ok(ctx)
}

/// Extracts `c`/`v`/`n` query-parameter aliases into a [`FallbackNameOverrides`].
#[must_use]
pub fn fallback_overrides_from_query(query: &[(String, String)]) -> FallbackNameOverrides {
    let mut overrides = FallbackNameOverrides::default();
    for (key, value) in query {
        match key.as_str() {
            CATALOG_QUERY_PARAM => overrides.catalog = Some(value.clone()),
            VARIANT_QUERY_PARAM => overrides.variant = Some(value.clone()),
            NAMESPACE_QUERY_PARAM => overrides.namespace = Some(value.clone()),
            _ => {}
        }
    }
    overrides
}

// ============================================================================
// SECTION: Step 5 — Policy Enforcement
// ============================================================================

/// Enforces that `action` is permitted on `target` under the view carried
/// by `ctx`.
///
/// # Errors
/// Returns [`ApiError`] (kind `Unauthorized`) when `ctx` has no view
/// definition (authentication did not run), or (kind `DisallowedByPolicy`)
/// when the policy engine denies the action.
pub fn enforce_policy(ctx: &CatalogContext, action: Action, target: &TargetResource) -> Result<(), ApiError> {
    let view = ctx
        .view_definition
        .as_ref()
        .ok_or_else(|| ApiError::unauthorized("request has no authenticated view"))?;
    if tansive_policy::is_authorized(view, action, target) {
        Ok(())
    } else {
        Err(ApiError::disallowed_by_policy(format!("{} is not permitted on {target}", action.as_str())))
    }
}

/// Returns `true` when `ctx.catalog_id` equals `catalog_id`.
#[must_use]
pub fn catalog_matches(ctx: &CatalogContext, catalog_id: CatalogId) -> bool {
    ctx.catalog_id == Some(catalog_id)
}

/// Returns `true` when `ctx.variant_id` equals `variant_id`.
#[must_use]
pub fn variant_matches(ctx: &CatalogContext, variant_id: VariantId) -> bool {
    ctx.variant_id == Some(variant_id)
}

/// Returns `true` when `ctx.namespace_id` equals `namespace_id`.
#[must_use]
pub fn namespace_matches(ctx: &CatalogContext, namespace_id: NamespaceId) -> bool {
    ctx.namespace_id == Some(namespace_id)
}
