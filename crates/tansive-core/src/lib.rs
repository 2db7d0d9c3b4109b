// crates/tansive-core/src/lib.rs
// ============================================================================
// Module: Tansive Core Library
// Description: Domain model and backend-agnostic interfaces shared by every Tansive crate.
// Purpose: Define tenants, catalog objects, policy vocabulary, and the repository/collaborator seams.
// Dependencies: serde, serde_json, thiserror, time, uuid
// ============================================================================

//! ## Overview
//! Tansive Core has no knowledge of HTTP, SQL, or cryptography; it defines
//! the shapes every other crate agrees on. Invariants:
//! - Identifiers are opaque and stable across serialization.
//! - Policy vocabulary ([`core::Rule`], [`core::ViewDefinition`]) is matched
//!   and evaluated by `tansive-policy`, not by this crate.
//! - Every fallible interface method returns a typed error; none panic on
//!   expected failure modes.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::ApiError;
pub use core::ErrorKind;
pub use core::ErrorResponse;
pub use interfaces::CatalogNameResolver;
pub use interfaces::NoopRevocationChecker;
pub use interfaces::RepositoryError;
pub use interfaces::RevocationChecker;
pub use interfaces::SessionRepository;
pub use interfaces::SigningKeyRepository;
pub use interfaces::SkillsetLookup;
pub use interfaces::SkillsetLookupError;
pub use interfaces::ViewRepository;
