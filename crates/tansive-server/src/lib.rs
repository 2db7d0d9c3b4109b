// crates/tansive-server/src/lib.rs
// ============================================================================
// Crate: tansive-server
// Description: The axum HTTP surface for the control-plane authorization
//              substrate: request context pipeline, auth/session routes,
//              and the operational endpoints.
// ============================================================================

//! ## Overview
//! This crate hosts every HTTP-facing concern:
//!
//! - [`correlation`]: client/server correlation ID policy (component 4.F
//!   step 1).
//! - [`telemetry`]: request/latency/policy-decision metrics sinks.
//! - [`errors`]: the `ApiError` → HTTP response bridge.
//! - [`pkce`]: the in-memory PKCE authorization-code store (component
//!   4.C).
//! - [`context`]: tenant resolution, authentication, and catalog-context
//!   loading/policy enforcement (component 4.F steps 2-5).
//! - [`state`]: [`state::AppState`], the collaborators every handler
//!   shares.
//! - [`skillset`]: the provisional [`tansive_core::interfaces::SkillsetLookup`]
//!   adapter.
//! - [`session`]: session-spec validation and the new-session workflow
//!   (component 4.E).
//! - [`routes`]: one handler per route.
//! - [`app`]: router assembly and cross-cutting middleware.

pub mod app;
pub mod context;
pub mod correlation;
pub mod errors;
pub mod pkce;
pub mod routes;
pub mod session;
pub mod skillset;
pub mod state;
pub mod telemetry;

pub use app::build_router;
pub use state::AppState;
pub use state::AppTokenService;
