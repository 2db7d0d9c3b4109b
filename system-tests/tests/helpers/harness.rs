// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Server Harness
// Description: Helpers for spawning an in-process Tansive server in tests.
// Purpose: Provide deterministic server startup and teardown for system tests.
// Dependencies: tansive-server, tansive-config, tansive-store-sqlite, tokio
// ============================================================================

//! ## Overview
//! Spawns a real [`tansive_server::AppState`] and axum router bound to an
//! ephemeral loopback port, inside a `tokio` task, so scenario tests exercise
//! the actual HTTP request pipeline rather than calling handlers directly.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tansive_config::Config;
use tansive_config::ConfigRaw;
use tansive_core::core::CatalogId;
use tansive_core::core::TenantId;
use tansive_core::core::VariantId;
use tansive_server::AppState;
use tansive_store_sqlite::SqliteStore;
use tokio::task::JoinHandle;

/// A spawned test server, torn down when [`ServerHandle::shutdown`] is called.
pub struct ServerHandle {
    base_url: String,
    state: Arc<AppState>,
    join: JoinHandle<()>,
}

impl ServerHandle {
    /// Returns the server's base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the shared application state, for in-process seeding.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Aborts the server task.
    pub async fn shutdown(self) {
        self.join.abort();
        let _ = self.join.await;
    }
}

/// Spawns a test server backed by a fresh SQLite file under `db_path`, with
/// the given tenant as `default_tenant_id` in single-user mode.
pub async fn spawn_server(db_path: &Path, single_user_mode: bool, default_tenant_id: Option<&TenantId>) -> ServerHandle {
    let toml = format!(
        r#"
        format_version = 1
        server_port = 0

        [auth]
        max_token_age = "24h"
        clock_skew = "5m"
        default_token_validity = "1h"

        [session]
        expiration_time = "30d"
        max_variables = 64

        [db]
        host = "localhost"
        port = 5432
        user = "tansive"
        password = "secret"
        dbname = "{dbname}"
        sslmode = "require"

        single_user_mode = {single_user_mode}
        {tenant_line}
        "#,
        dbname = db_path.display(),
        tenant_line = default_tenant_id.map_or_else(String::new, |id| format!(
            "default_tenant_id = \"{id}\"\ndefault_project_id = \"P1\""
        )),
    );
    let raw: ConfigRaw = toml::from_str(&toml).expect("harness config is valid toml");
    let config = Config::from_raw(raw).expect("harness config passes validation");

    let state = AppState::build(config, "system-tests-passphrase".to_string()).expect("app state builds");
    let router = tansive_server::build_router(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let addr: SocketAddr = listener.local_addr().expect("read bound address");
    let base_url = format!("http://{addr}");

    let join = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    ServerHandle {
        base_url,
        state,
        join,
    }
}

/// Seeds a catalog and variant directly in the store, bypassing HTTP.
pub fn seed_catalog_and_variant(store: &SqliteStore, tenant_id: &TenantId, catalog_name: &str, variant_name: &str) -> (CatalogId, VariantId) {
    let catalog_id = CatalogId::new();
    store.insert_catalog(tenant_id, catalog_id, catalog_name).expect("insert catalog");
    let variant_id = VariantId::new();
    store.insert_variant(tenant_id, variant_id, catalog_id, variant_name).expect("insert variant");
    (catalog_id, variant_id)
}

