// crates/tansive-policy/src/lib.rs
// ============================================================================
// Module: Tansive Policy Library
// Description: Resource matching and the allow/deny/admin/subset evaluation engine.
// Purpose: Decide what a view authorizes, and whether one view derives from another.
// Dependencies: tansive-core
// ============================================================================

//! ## Overview
//! Tansive Policy has no notion of HTTP, tokens, or persistence — it is a
//! pure function of a [`tansive_core::core::ViewDefinition`] and a
//! requested action/target. [`matcher`] implements the primitive
//! segment comparisons; [`engine`] composes them into authorization and
//! subset/derivation decisions.

pub mod engine;
pub mod matcher;

pub use engine::is_authorized;
pub use engine::is_subset_of;
pub use engine::validate_derived_view;
pub use matcher::MatcherError;
pub use matcher::canonicalize_target;
pub use matcher::segments_match;
