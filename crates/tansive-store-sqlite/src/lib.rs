// crates/tansive-store-sqlite/src/lib.rs
// ============================================================================
// Crate: tansive-store-sqlite
// Description: SQLite-backed persistence for signing keys, views, sessions, and catalog names.
// ============================================================================

//! ## Overview
//! This crate is Tansive's relational layer: a single `SQLite` database,
//! accessed through [`store::SqliteStore`], backing the repository traits
//! `tansive-core` defines.

pub mod store;

pub use store::SqliteStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
