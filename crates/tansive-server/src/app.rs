// crates/tansive-server/src/app.rs
// ============================================================================
// Module: Router Assembly
// Description: Wires every handler to the shared AppState and the
//              cross-cutting request-guard/correlation/metrics middleware.
// Purpose: Produce the single axum Router the binary serves.
// Dependencies: axum, tokio
// ============================================================================

//! ## Overview
//! [`build_router`] assembles the full route table and layers three
//! middleware passes around it, outermost first: [`request_guard`] (panic
//! recovery and a hard request timeout, component 4.F step 1 and the
//! "Cancellation and timeouts" rule), [`correlation_layer`] (assigns and
//! echoes correlation IDs), and [`metrics_layer`] (request/latency
//! counters). No `tower`/`tower-http` dependency is introduced: the guard
//! is built directly from `tokio::time::timeout` plus `tokio::spawn`, the
//! same primitives this crate already reaches for elsewhere.

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use axum::Router;
use axum::extract::MatchedPath;
use axum::extract::Request;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use tansive_core::core::ApiError;
use tansive_core::core::ErrorResponse;

use crate::correlation::CLIENT_CORRELATION_HEADER;
use crate::correlation::CorrelationContext;
use crate::correlation::SERVER_CORRELATION_HEADER;
use crate::errors::HttpApiError;
use crate::routes;
use crate::state::AppState;
use crate::telemetry::RequestMetricEvent;
use crate::telemetry::RequestOutcome;

/// Default wall-clock budget for a single request (component 4.F
/// "Cancellation and timeouts").
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the complete router, state already attached.
#[must_use]
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/version", get(routes::version))
        .route("/ready", get(routes::ready))
        .route("/.well-known/jwks.json", get(routes::jwks))
        .route("/auth/adopt-view/{catalog_ref}/{view_label}", post(routes::adopt_view))
        .route("/auth/adopt-default-view/{catalog_ref}", post(routes::adopt_default_view))
        .route("/sessions", post(routes::create_session))
        .route("/sessions/execution-state", post(routes::exchange_execution_token).get(routes::get_execution_state))
        .route("/views", post(routes::create_view))
        .route("/views/{label}", get(routes::get_view))
        .layer(axum::middleware::from_fn_with_state(Arc::clone(&state), metrics_layer))
        .layer(axum::middleware::from_fn_with_state(Arc::clone(&state), correlation_layer))
        .layer(axum::middleware::from_fn(request_guard))
        .with_state(state)
}

/// Maps a `(method, matched route pattern)` pair to a stable metrics label.
///
/// Falls back to `"OTHER"` for anything not in the fixed route table above,
/// which should only happen for axum's own 404 fallback.
fn route_label(method: &Method, matched_path: &str) -> &'static str {
    match (method.as_str(), matched_path) {
        ("GET", "/version") => "GET /version",
        ("GET", "/ready") => "GET /ready",
        ("GET", "/.well-known/jwks.json") => "GET /jwks",
        ("POST", "/auth/adopt-view/{catalog_ref}/{view_label}") => "POST /auth/adopt-view",
        ("POST", "/auth/adopt-default-view/{catalog_ref}") => "POST /auth/adopt-default-view",
        ("POST", "/sessions") => "POST /sessions",
        ("POST", "/sessions/execution-state") => "POST /sessions/execution-state",
        ("GET", "/sessions/execution-state") => "GET /sessions/execution-state",
        ("POST", "/views") => "POST /views",
        ("GET", "/views/{label}") => "GET /views/{label}",
        _ => "OTHER",
    }
}

/// Recovers a panicking handler into a 500 response and enforces
/// [`REQUEST_TIMEOUT`] on every request (component 4.F step 1; the
/// "Cancellation and timeouts" rule mandates a `tokio::time::timeout`
/// wrap with a 504 on expiry).
async fn request_guard(req: Request, next: Next) -> Response {
    match tokio::time::timeout(REQUEST_TIMEOUT, tokio::spawn(next.run(req))).await {
        Ok(Ok(response)) => response,
        Ok(Err(_join_error)) => HttpApiError(ApiError::internal("request handler panicked")).into_response(),
        Err(_elapsed) => (
            StatusCode::GATEWAY_TIMEOUT,
            axum::Json(ErrorResponse {
                result: 0,
                error: "request timed out".to_string(),
            }),
        )
            .into_response(),
    }
}

/// Assigns a correlation context to the request and echoes the
/// server-issued ID back on the response (component 4.F step 1).
async fn correlation_layer(State(state): State<Arc<AppState>>, mut req: Request, next: Next) -> Response {
    let client_header = req
        .headers()
        .get(CLIENT_CORRELATION_HEADER)
        .and_then(|value| value.to_str().ok());
    let context = match CorrelationContext::from_header(client_header, &state.correlation) {
        Ok(context) => context,
        Err(rejection) => {
            let error = ApiError::invalid(format!("invalid {CLIENT_CORRELATION_HEADER} header: {rejection}"));
            return HttpApiError(error).into_response();
        }
    };
    req.extensions_mut().insert(context.clone());

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&context.server_id) {
        response.headers_mut().insert(HeaderName::from_static(SERVER_CORRELATION_HEADER), value);
    }
    response
}

/// Records request and latency metrics for every handled request
/// (component 4.D "Observability").
async fn metrics_layer(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let matched_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_default();
    let context = req.extensions().get::<CorrelationContext>().cloned();
    let started_at = Instant::now();

    let response = next.run(req).await;

    let latency = started_at.elapsed();
    let event = RequestMetricEvent {
        route: route_label(&method, &matched_path),
        outcome: if response.status().is_success() { RequestOutcome::Ok } else { RequestOutcome::Error },
        status_code: response.status().as_u16(),
        unsafe_client_correlation_id: context.as_ref().and_then(|ctx| ctx.unsafe_client_id.clone()),
        server_correlation_id: context.map(|ctx| ctx.server_id),
    };
    state.metrics.record_request(event.clone());
    state.metrics.record_latency(event, latency);
    response
}
