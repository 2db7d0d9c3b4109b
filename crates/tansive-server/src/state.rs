// crates/tansive-server/src/state.rs
// ============================================================================
// Module: Server State
// Description: The shared, cloneable state every handler reads from.
// Purpose: Wire together storage, crypto, token, and policy collaborators.
// Dependencies: tansive-config, tansive-core, tansive-crypto, tansive-store-sqlite, tansive-token
// ============================================================================

//! ## Overview
//! [`AppState`] bundles every collaborator a handler needs: the SQLite
//! store (satisfying every repository and resolver trait at once), the
//! signing-key store, the token service, the PKCE auth-code store, and the
//! loaded configuration. It is built once at startup by [`AppState::build`]
//! and shared behind an `Arc` across the axum router.

use std::sync::Arc;

use tansive_config::Config;
use tansive_core::interfaces::NoopRevocationChecker;
use tansive_crypto::SigningKeyStore;
use tansive_store_sqlite::SqliteStore;
use tansive_store_sqlite::SqliteStoreConfig;
use tansive_token::TokenService;
use tansive_token::TokenServiceConfig;

use crate::correlation::CorrelationIdGenerator;
use crate::pkce::AuthCodeStore;
use crate::skillset::SkillsetLookupStub;
use crate::telemetry::NoopMetrics;
use crate::telemetry::ServerMetrics;

/// The concrete token service type this server wires up: signing keys and
/// views both backed by the same [`SqliteStore`], revocation not yet
/// implemented.
pub type AppTokenService = TokenService<SqliteStore, SqliteStore, NoopRevocationChecker>;

/// Shared application state, cheap to clone (every field is an `Arc` or a
/// small value type).
pub struct AppState {
    /// The single SQLite-backed store, satisfying every repository trait.
    pub store: SqliteStore,
    /// Mints and validates bearer tokens.
    pub token_service: AppTokenService,
    /// Outstanding PKCE authorization codes.
    pub auth_codes: AuthCodeStore,
    /// Loaded, validated configuration.
    pub config: Config,
    /// Generates server-side correlation IDs.
    pub correlation: CorrelationIdGenerator,
    /// Metrics and audit-event sink.
    pub metrics: Arc<dyn ServerMetrics>,
    /// Resolves a skill's exported actions (component 4.E.1).
    pub skillsets: SkillsetLookupStub,
}

impl AppState {
    /// Builds application state from a loaded [`Config`], opening the
    /// SQLite store at `config.db.dbname` as the file path.
    ///
    /// # Errors
    /// Returns a boxed error when the store cannot be opened.
    pub fn build(config: Config, signing_key_passphrase: String) -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let store_config = SqliteStoreConfig::new(config.db.dbname.clone().into());
        let store = SqliteStore::open(&store_config)?;

        let signing_keys = SigningKeyStore::new(store.clone(), signing_key_passphrase);
        let token_service_config = TokenServiceConfig {
            issuer: "tansive".to_string(),
            audience: "tansive-api".to_string(),
            default_token_validity: to_time_duration(config.auth.default_token_validity),
            max_token_age: to_time_duration(config.auth.max_token_age),
            clock_skew: to_time_duration(config.auth.clock_skew),
        };
        let token_service =
            TokenService::new(signing_keys, store.clone(), NoopRevocationChecker, token_service_config);

        Ok(Arc::new(Self {
            store,
            token_service,
            auth_codes: AuthCodeStore::new(),
            config,
            correlation: CorrelationIdGenerator::new("tansive"),
            metrics: Arc::new(NoopMetrics),
            skillsets: SkillsetLookupStub,
        }))
    }
}

/// Converts a `std::time::Duration` (as loaded from TOML) into a
/// `time::Duration` (as required by `TokenServiceConfig`).
fn to_time_duration(value: std::time::Duration) -> time::Duration {
    time::Duration::try_from(value).unwrap_or(time::Duration::ZERO)
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
    fn to_time_duration_converts_whole_seconds() {
        let converted = to_time_duration(std::time::Duration::from_secs(3600));
        assert_eq!(converted, time::Duration::seconds(3600));
    }
}
