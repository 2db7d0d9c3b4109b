// crates/tansive-contract/src/lib.rs
// ============================================================================
// Crate: tansive-contract
// Description: Wire DTOs shared between the server and its clients.
// ============================================================================

//! ## Overview
//! This crate is the thin vocabulary layer between `tansive-server`'s HTTP
//! handlers and the domain types in `tansive-core`: request and response
//! bodies that need a stable, documented JSON shape independent of how the
//! domain model happens to be laid out internally.

pub mod dto;

pub use dto::AdoptViewResponse;
pub use dto::CreateSessionBatchResponse;
pub use dto::CreateSessionInteractiveResponse;
pub use dto::CreateViewRequest;
pub use dto::ExchangeExecutionTokenResponse;
pub use dto::ExportedActionEntry;
pub use dto::JsonWebKey;
pub use dto::JwksResponse;
pub use dto::ReadyResponse;
pub use dto::VersionResponse;
pub use dto::ViewResponse;
