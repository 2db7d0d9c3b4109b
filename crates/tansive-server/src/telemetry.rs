// crates/tansive-server/src/telemetry.rs
// ============================================================================
// Module: Server Telemetry
// Description: Observability hooks for the HTTP request pipeline and policy engine.
// Purpose: Provide metric events and latency buckets without hard deps.
// Dependencies: (none beyond std)
// ============================================================================

//! ## Overview
//! This module exposes a thin metrics interface for request counters,
//! latency histograms, and policy-decision audit events (component 4.D
//! "Observability"). It is intentionally dependency-light so downstream
//! deployments can plug in Prometheus or OpenTelemetry without redesign.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use tansive_core::core::Action;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default latency buckets in milliseconds for request histograms.
pub const REQUEST_LATENCY_BUCKETS_MS: &[u64] =
    &[1, 2, 5, 10, 25, 50, 100, 250, 500, 1_000, 2_500, 5_000, 10_000, 30_000];

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// Request outcome classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum RequestOutcome {
    /// Successful request.
    Ok,
    /// Failed request.
    Error,
}

impl RequestOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// Request metric event payload.
///
/// # Invariants
/// - Optional fields are `None` when the metadata is unavailable.
#[derive(Debug, Clone)]
pub struct RequestMetricEvent {
    /// Route label, e.g. `POST /sessions`.
    pub route: &'static str,
    /// Request outcome.
    pub outcome: RequestOutcome,
    /// HTTP status code returned.
    pub status_code: u16,
    /// Unsafe client correlation identifier when available.
    pub unsafe_client_correlation_id: Option<String>,
    /// Server-issued correlation identifier when available.
    pub server_correlation_id: Option<String>,
}

/// A single policy evaluation, emitted once per `is_authorized` call
/// (component 4.D "Observability").
#[derive(Debug, Clone)]
pub struct PolicyDecisionEvent {
    /// The action that was evaluated.
    pub action: Action,
    /// The canonicalized target resource string.
    pub target: String,
    /// Whether the action was allowed.
    pub decision: bool,
    /// Count of allow-rules that matched the target (informational).
    pub matched_allow: usize,
    /// Count of deny-rules that matched the target (informational).
    pub matched_deny: usize,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for requests, latencies, and policy decisions.
pub trait ServerMetrics: Send + Sync {
    /// Records a request counter event.
    fn record_request(&self, event: RequestMetricEvent);
    /// Records a latency observation for the request.
    fn record_latency(&self, event: RequestMetricEvent, latency: Duration);
    /// Records a policy-decision audit event.
    fn record_policy_decision(&self, event: PolicyDecisionEvent);
}

/// No-op metrics sink.
///
/// # Invariants
/// - Metrics are intentionally discarded.
pub struct NoopMetrics;

impl ServerMetrics for NoopMetrics {
    fn record_request(&self, _event: RequestMetricEvent) {}

    fn record_latency(&self, _event: RequestMetricEvent, _latency: Duration) {}

    fn record_policy_decision(&self, _event: PolicyDecisionEvent) {}
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
    fn noop_metrics_accepts_every_event_without_panicking() {
        let sink = NoopMetrics;
        sink.record_request(RequestMetricEvent {
            route: "POST /sessions",
            outcome: RequestOutcome::Ok,
            status_code: 201,
            unsafe_client_correlation_id: None,
            server_correlation_id: Some("tansive-1-1".to_string()),
        });
        sink.record_policy_decision(PolicyDecisionEvent {
            action: Action::ResourceRead,
            target: "res://catalog/c/resource/x".to_string(),
            decision: true,
            matched_allow: 1,
            matched_deny: 0,
        });
    }

    #[test]
    fn outcome_labels_are_stable() {
        assert_eq!(RequestOutcome::Ok.as_str(), "ok");
        assert_eq!(RequestOutcome::Error.as_str(), "error");
    }
}
