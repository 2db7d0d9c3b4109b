// crates/tansive-server/src/routes.rs
// ============================================================================
// Module: HTTP Handlers
// Description: Every route this server exposes.
// Purpose: Wire the request context pipeline and session manager to axum.
// Dependencies: axum, tansive-contract, tansive-core, tansive-policy, tansive-token
// ============================================================================

//! ## Overview
//! One handler per route. Every handler follows the same shape: resolve
//! tenant, authenticate, load catalog context, enforce policy, then do the
//! one thing the route is for. Wire shapes come from `tansive-contract`;
//! domain errors are `tansive_core::core::ApiError`, converted to HTTP
//! responses by [`crate::errors::HttpApiError`].

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Map;
use serde_json::Value;
use time::OffsetDateTime;

use tansive_contract::AdoptViewResponse;
use tansive_contract::CreateSessionBatchResponse;
use tansive_contract::CreateSessionInteractiveResponse;
use tansive_contract::CreateViewRequest;
use tansive_contract::ExchangeExecutionTokenResponse;
use tansive_contract::JsonWebKey;
use tansive_contract::JwksResponse;
use tansive_contract::ReadyResponse;
use tansive_contract::VersionResponse;
use tansive_contract::ViewResponse;
use tansive_core::core::Action;
use tansive_core::core::ApiError;
use tansive_core::core::Session;
use tansive_core::core::SessionId;
use tansive_core::core::SessionSpec;
use tansive_core::core::SessionStatus;
use tansive_core::core::Subject;
use tansive_core::core::TargetResource;
use tansive_core::core::View;
use tansive_core::core::ViewId;
use tansive_core::interfaces::SessionRepository;
use tansive_core::interfaces::SigningKeyRepository;
use tansive_core::interfaces::ViewRepository;
use tansive_token::SUBJECT_SESSION_PREFIX;
use tansive_token::SUBJECT_USER_PREFIX;

use crate::context::FallbackNameOverrides;
use crate::context::PathNameOverrides;
use crate::context::catalog_context_from_token;
use crate::context::enforce_policy;
use crate::context::extract_bearer_token;
use crate::context::fallback_overrides_from_query;
use crate::context::load_catalog_context;
use crate::context::resolve_tenant_id;
use crate::errors::HttpApiError;
use crate::session;
use crate::state::AppState;

/// Default view label adopted when no explicit label is given
/// (`POST /auth/adopt-default-view/{catalogRef}`).
const DEFAULT_VIEW_LABEL: &str = "default";

type JsonResult<T> = Result<Json<T>, HttpApiError>;

// ============================================================================
// SECTION: Operational Endpoints
// ============================================================================

/// `GET /version`.
pub async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /ready`. Reports 503 rather than an error body when the store is
/// unreachable, per component 7's status-code table.
pub async fn ready(State(state): State<Arc<AppState>>) -> Result<Json<ReadyResponse>, StatusCode> {
    SigningKeyRepository::readiness(&state.store).map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;
    Ok(Json(ReadyResponse { ready: true }))
}

/// `GET /.well-known/jwks.json`. Returns the caller's tenant's active
/// public key, or an empty key set when none has been minted yet.
pub async fn jwks(State(state): State<Arc<AppState>>, headers: HeaderMap) -> JsonResult<JwksResponse> {
    let tenant_id = resolve_tenant_id(&headers, state.config.single_user_mode, state.config.default_tenant_id.as_ref())?;
    let active = state.store.load_active(&tenant_id).map_err(|err| ApiError::internal("failed to load signing key").with_cause(err))?;
    let keys = active
        .into_iter()
        .map(|key| JsonWebKey {
            kty: "OKP".to_string(),
            crv: "Ed25519".to_string(),
            use_: "sig".to_string(),
            x: URL_SAFE_NO_PAD.encode(&key.public_key),
        })
        .collect();
    Ok(Json(JwksResponse { keys }))
}

// ============================================================================
// SECTION: Auth — View Adoption
// ============================================================================

/// `POST /auth/adopt-view/{catalogRef}/{viewLabel}`. Mints a token asserting
/// `viewLabel`, which must be a policy subset of the caller's currently
/// adopted view.
pub async fn adopt_view(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((catalog_ref, view_label)): Path<(String, String)>,
) -> JsonResult<AdoptViewResponse> {
    adopt_view_impl(&state, &headers, &catalog_ref, &view_label).await
}

/// `POST /auth/adopt-default-view/{catalogRef}`. Equivalent to adopting
/// [`DEFAULT_VIEW_LABEL`].
pub async fn adopt_default_view(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(catalog_ref): Path<String>,
) -> JsonResult<AdoptViewResponse> {
    adopt_view_impl(&state, &headers, &catalog_ref, DEFAULT_VIEW_LABEL).await
}

async fn adopt_view_impl(state: &AppState, headers: &HeaderMap, catalog_ref: &str, view_label: &str) -> JsonResult<AdoptViewResponse> {
    let tenant_id = resolve_tenant_id(headers, state.config.single_user_mode, state.config.default_tenant_id.as_ref())?;
    let token_string = extract_bearer_token(headers)?;
    let current_token = state.token_service.parse_and_validate_token(token_string, &tenant_id)?;
    let ctx = catalog_context_from_token(&current_token)?;

    let Subject::User { user_id } = ctx.subject.clone() else {
        return Err(ApiError::unauthorized("only a user-bound token may adopt a view").into());
    };

    let ctx = load_catalog_context(
        &state.store,
        ctx,
        &PathNameOverrides { catalog: Some(catalog_ref), variant: None, namespace: None },
        &FallbackNameOverrides::default(),
    )?;
    let catalog_id = ctx.catalog_id.ok_or_else(|| ApiError::not_found(format!("catalog '{catalog_ref}' not found")))?;

    let target_view = state
        .store
        .get_by_label(&tenant_id, &catalog_id, view_label)
        .map_err(|err| ApiError::internal("failed to load view").with_cause(err))?
        .ok_or_else(|| ApiError::not_found(format!("view '{view_label}' not found")))?;

    let mut extra = Map::new();
    extra.insert("sub".to_string(), Value::String(format!("{SUBJECT_USER_PREFIX}{user_id}")));
    let (token, expires_at) = state.token_service.create_token(&target_view, extra, current_token.view().into())?;

    Ok(Json(AdoptViewResponse { token, expires_at }))
}

// ============================================================================
// SECTION: Sessions
// ============================================================================

/// Query parameters accepted by `POST /sessions`.
#[derive(Debug, Default)]
struct CreateSessionQuery {
    interactive: bool,
    code_challenge: Option<String>,
}

fn parse_create_session_query(params: &HashMap<String, String>) -> CreateSessionQuery {
    CreateSessionQuery {
        interactive: params.get("interactive").is_some_and(|v| v == "true"),
        code_challenge: params.get("code_challenge").cloned(),
    }
}

/// `POST /sessions`. Creates a session for a skill under a view derived
/// from the caller's currently adopted view. In interactive mode
/// (`?interactive=true&code_challenge=…`) responds with a PKCE code the
/// caller's tangent must exchange; otherwise responds with the session ID
/// directly.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(raw_query): Query<HashMap<String, String>>,
    Json(spec): Json<SessionSpec>,
) -> Result<axum::response::Response, HttpApiError> {
    let query = parse_create_session_query(&raw_query);
    let tenant_id = resolve_tenant_id(&headers, state.config.single_user_mode, state.config.default_tenant_id.as_ref())?;
    let token_string = extract_bearer_token(&headers)?;
    let token = state.token_service.parse_and_validate_token(token_string, &tenant_id)?;
    let ctx = catalog_context_from_token(&token)?;

    let Subject::User { user_id } = ctx.subject.clone() else {
        return Err(ApiError::unauthorized("only a user-bound token may create a session").into());
    };

    let fallback = fallback_overrides_from_query(&raw_query.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Vec<_>>());
    let ctx = load_catalog_context(&state.store, ctx, &PathNameOverrides::default(), &fallback)?;
    let catalog_id = ctx.catalog_id.ok_or_else(|| ApiError::invalid("request has no resolvable catalog"))?;
    let variant_id = ctx.variant_id.ok_or_else(|| ApiError::invalid("request has no resolvable variant"))?;

    let current_view = ctx.view_definition.as_ref().ok_or_else(|| ApiError::unauthorized("request has no authenticated view"))?;

    session::validate_session_variables(spec.session_variables.as_ref(), state.config.session.max_variables)?;
    let (skillset_path, skill) = session::validate_skill_path(&spec.skill_path)?;

    let target_view = state
        .store
        .get_by_label(&tenant_id, &catalog_id, &spec.view_name)
        .map_err(|err| ApiError::internal("failed to load view").with_cause(err))?
        .ok_or_else(|| ApiError::not_found(format!("view '{}' not found", spec.view_name)))?;

    session::require_derived_view(current_view, &target_view.rules)?;

    let adopt_target = TargetResource::parse(&target_view.resource_path()).map_err(|err| ApiError::invalid(err.to_string()))?;
    enforce_policy(&ctx, Action::CatalogAdoptView, &adopt_target)?;

    session::check_skillset_export(&state.skillsets, &tenant_id, &target_view.rules, &skillset_path, &skill)?;

    let now = OffsetDateTime::now_utc();
    let expiration = time::Duration::try_from(state.config.session.expiration_time).unwrap_or(time::Duration::ZERO);
    let session = Session {
        session_id: SessionId::new(),
        skillset_path,
        skill,
        view_id: target_view.view_id,
        view_definition_snapshot: target_view.rules.clone(),
        variables: spec.session_variables.unwrap_or(Value::Null),
        input_args: spec.input_args.unwrap_or(Value::Null),
        status_summary: SessionStatus::Created,
        user_id,
        catalog_id,
        variant_id,
        started_at: now,
        ended_at: None,
        expires_at: now + expiration,
    };
    state
        .store
        .insert(&session)
        .map_err(|err| ApiError::internal("failed to persist session").with_cause(err))?;

    if query.interactive {
        let code_challenge = query.code_challenge.ok_or_else(|| ApiError::invalid("interactive session creation requires code_challenge"))?;
        let code = state
            .auth_codes
            .issue(session.session_id, code_challenge)
            .map_err(|err| ApiError::internal("failed to issue authorization code").with_cause(err))?;
        let body = CreateSessionInteractiveResponse {
            code,
            tangent_url: format!("/sessions/{}/execution-state", session.session_id),
        };
        let value = serde_json::to_value(body).map_err(|err| ApiError::internal("failed to encode response").with_cause(err))?;
        Ok((StatusCode::CREATED, Json(value)).into_response())
    } else {
        let location = format!("/sessions/{}", session.session_id);
        let body = CreateSessionBatchResponse { session_id: session.session_id.to_string() };
        let value = serde_json::to_value(body).map_err(|err| ApiError::internal("failed to encode response").with_cause(err))?;
        let location_header = HeaderValue::from_str(&location).map_err(|err| ApiError::internal("failed to build location header").with_cause(err))?;
        Ok((StatusCode::CREATED, [(header::LOCATION, location_header)], Json(value)).into_response())
    }
}

/// Query parameters accepted by `POST /sessions/execution-state`.
#[derive(Debug, serde::Deserialize)]
pub struct ExchangeExecutionTokenQuery {
    /// The PKCE authorization code issued at session creation.
    pub code: String,
    /// The PKCE code verifier the caller holds.
    pub code_verifier: String,
}

/// `POST /sessions/execution-state`. Exchanges a PKCE authorization code
/// for a session-scoped bearer token.
pub async fn exchange_execution_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ExchangeExecutionTokenQuery>,
) -> JsonResult<ExchangeExecutionTokenResponse> {
    let tenant_id = resolve_tenant_id(&headers, state.config.single_user_mode, state.config.default_tenant_id.as_ref())?;

    let metadata = state
        .auth_codes
        .redeem(&query.code, &query.code_verifier)
        .map_err(|err| ApiError::unauthorized(err.to_string()))?;

    let session = state
        .store
        .get(&metadata.session_id)
        .map_err(|err| ApiError::internal("failed to load session").with_cause(err))?
        .ok_or_else(|| ApiError::not_found("session not found"))?;

    let synthetic_view = View {
        view_id: session.view_id,
        label: String::new(),
        catalog_id: session.catalog_id,
        rules: session.view_definition_snapshot.clone(),
        tenant_id: tenant_id.clone(),
        created_at: session.started_at,
    };

    let mut extra = Map::new();
    extra.insert("sub".to_string(), Value::String(format!("{SUBJECT_SESSION_PREFIX}{}", session.session_id)));
    extra.insert("token_use".to_string(), Value::String("execution".to_string()));
    let (token, expiry) = state.token_service.create_token(&synthetic_view, extra, None)?;

    Ok(Json(ExchangeExecutionTokenResponse { token, expiry }))
}

/// `GET /sessions/execution-state`. Returns the [`tansive_core::core::ExecutionState`]
/// a session-bound caller is authorized to execute.
pub async fn get_execution_state(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> JsonResult<tansive_core::core::ExecutionState> {
    let tenant_id = resolve_tenant_id(&headers, state.config.single_user_mode, state.config.default_tenant_id.as_ref())?;
    let token_string = extract_bearer_token(&headers)?;
    let token = state.token_service.parse_and_validate_token(token_string, &tenant_id)?;
    let ctx = catalog_context_from_token(&token)?;

    let Subject::Session { session_id } = ctx.subject else {
        return Err(ApiError::unauthorized("execution state is only available to a session-bound token").into());
    };

    let session = state
        .store
        .get(&session_id)
        .map_err(|err| ApiError::internal("failed to load session").with_cause(err))?
        .ok_or_else(|| ApiError::not_found("session not found"))?;

    Ok(Json(tansive_core::core::ExecutionState {
        session_id: session.session_id,
        skillset_path: session.skillset_path,
        skill: session.skill,
        view_definition: session.view_definition_snapshot,
        variables: session.variables,
        input_args: session.input_args,
        tenant_id: tenant_id.as_str().to_string(),
    }))
}

// ============================================================================
// SECTION: Declarative View Management (minimal)
// ============================================================================

/// `POST /views`. Creates a view under the authenticated catalog context.
pub async fn create_view(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(raw_query): Query<HashMap<String, String>>,
    Json(request): Json<CreateViewRequest>,
) -> Result<(StatusCode, Json<ViewResponse>), HttpApiError> {
    let tenant_id = resolve_tenant_id(&headers, state.config.single_user_mode, state.config.default_tenant_id.as_ref())?;
    let token_string = extract_bearer_token(&headers)?;
    let token = state.token_service.parse_and_validate_token(token_string, &tenant_id)?;
    let ctx = catalog_context_from_token(&token)?;
    let fallback = fallback_overrides_from_query(&raw_query.into_iter().collect::<Vec<_>>());
    let ctx = load_catalog_context(&state.store, ctx, &PathNameOverrides::default(), &fallback)?;
    let catalog_id = ctx.catalog_id.ok_or_else(|| ApiError::invalid("request has no resolvable catalog"))?;

    let view = View {
        view_id: ViewId::new(),
        label: request.label.clone(),
        catalog_id,
        rules: request.rules,
        tenant_id,
        created_at: OffsetDateTime::now_utc(),
    };
    let admin_target = TargetResource::parse(&view.resource_path()).map_err(|err| ApiError::invalid(err.to_string()))?;
    enforce_policy(&ctx, Action::CatalogAdmin, &admin_target)?;

    state
        .store
        .insert(&view)
        .map_err(map_view_insert_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ViewResponse { view_id: view.view_id.to_string(), label: view.label, rules: view.rules }),
    ))
}

/// `GET /views/{label}`. Loads a view by label under the authenticated
/// catalog context.
pub async fn get_view(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(raw_query): Query<HashMap<String, String>>,
    Path(label): Path<String>,
) -> JsonResult<ViewResponse> {
    let tenant_id = resolve_tenant_id(&headers, state.config.single_user_mode, state.config.default_tenant_id.as_ref())?;
    let token_string = extract_bearer_token(&headers)?;
    let token = state.token_service.parse_and_validate_token(token_string, &tenant_id)?;
    let ctx = catalog_context_from_token(&token)?;
    let fallback = fallback_overrides_from_query(&raw_query.into_iter().collect::<Vec<_>>());
    let ctx = load_catalog_context(&state.store, ctx, &PathNameOverrides::default(), &fallback)?;
    let catalog_id = ctx.catalog_id.ok_or_else(|| ApiError::invalid("request has no resolvable catalog"))?;

    let view = state
        .store
        .get_by_label(&tenant_id, &catalog_id, &label)
        .map_err(|err| ApiError::internal("failed to load view").with_cause(err))?
        .ok_or_else(|| ApiError::not_found(format!("view '{label}' not found")))?;

    let target = TargetResource::parse(&view.resource_path()).map_err(|err| ApiError::invalid(err.to_string()))?;
    enforce_policy(&ctx, Action::ResourceRead, &target)?;

    Ok(Json(ViewResponse { view_id: view.view_id.to_string(), label: view.label, rules: view.rules }))
}

/// Maps a view-insert [`tansive_core::interfaces::RepositoryError`] to the
/// appropriate [`ApiError`] kind, surfacing a uniqueness violation as a
/// conflict rather than an opaque internal error.
fn map_view_insert_error(err: tansive_core::interfaces::RepositoryError) -> ApiError {
    match err {
        tansive_core::interfaces::RepositoryError::Conflict(message) => ApiError::conflict(message),
        other => ApiError::internal("failed to persist view").with_cause(other),
    }
}
