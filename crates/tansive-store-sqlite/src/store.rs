// crates/tansive-store-sqlite/src/store.rs
// ============================================================================
// Module: Tansive SQLite Store
// Description: SQLite-backed signing key, view, session, and catalog-name storage.
// Purpose: Durable persistence for the repository traits tansive-core defines.
// Dependencies: rusqlite, serde_json, tansive-core, thiserror, time, uuid
// ============================================================================

//! ## Overview
//! [`SqliteStore`] is a single `SQLite` database (WAL mode) backing four
//! collaborator seams: [`SigningKeyRepository`], [`ViewRepository`],
//! [`SessionRepository`], and [`CatalogNameResolver`]. All access goes
//! through one mutex-guarded connection; Tansive's relational layer is
//! treated as a thin external collaborator, not a high-throughput write
//! path, so no writer-batching or read-pool apparatus is needed here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use tansive_core::core::CatalogId;
use tansive_core::core::NamespaceId;
use tansive_core::core::Session;
use tansive_core::core::SessionId;
use tansive_core::core::SessionStatus;
use tansive_core::core::SigningKey;
use tansive_core::core::SigningKeyId;
use tansive_core::core::TenantId;
use tansive_core::core::VariantId;
use tansive_core::core::View;
use tansive_core::core::ViewDefinition;
use tansive_core::core::ViewId;
use tansive_core::interfaces::CatalogNameResolver;
use tansive_core::interfaces::RepositoryError;
use tansive_core::interfaces::SessionRepository;
use tansive_core::interfaces::SigningKeyRepository;
use tansive_core::interfaces::ViewRepository;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout in milliseconds.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced, safe under WAL).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite`-backed store.
///
/// # Invariants
/// - `path` must resolve to a file path, not a directory.
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Builds a config pointing at `path` with default pragma settings.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Stored data failed to deserialize or violated an invariant.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// A uniqueness constraint was violated on insert.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
}

impl From<SqliteStoreError> for RepositoryError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) | SqliteStoreError::Db(message) => Self::Io(message),
            SqliteStoreError::VersionMismatch(message) | SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
        }
    }
}

/// Classifies a `rusqlite` error, distinguishing constraint violations
/// (mapped to [`SqliteStoreError::Conflict`]) from all other engine errors.
fn map_db_err(err: rusqlite::Error) -> SqliteStoreError {
    if let rusqlite::Error::SqliteFailure(sqlite_err, _) = &err
        && sqlite_err.code == ErrorCode::ConstraintViolation
    {
        return SqliteStoreError::Conflict(err.to_string());
    }
    SqliteStoreError::Db(err.to_string())
}

/// Formats a timestamp for storage.
fn format_timestamp(value: OffsetDateTime) -> Result<String, SqliteStoreError> {
    value.format(&Rfc3339).map_err(|err| SqliteStoreError::Invalid(err.to_string()))
}

/// Parses a stored timestamp.
fn parse_timestamp(value: &str) -> Result<OffsetDateTime, SqliteStoreError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|err| SqliteStoreError::Invalid(err.to_string()))
}

// ============================================================================
// SECTION: Connection Setup
// ============================================================================

/// Validates that `path` can be used as a store file.
fn validate_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid("store path must be a file, not a directory".to_string()));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(connection: &Connection, config: &SqliteStoreConfig) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Creates the schema on first open, or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE signing_keys (
                    tenant_id TEXT NOT NULL,
                    key_id TEXT NOT NULL,
                    public_key BLOB NOT NULL,
                    encrypted_private_key BLOB NOT NULL,
                    is_active INTEGER NOT NULL,
                    created_at TEXT NOT NULL,
                    expires_at TEXT,
                    PRIMARY KEY (tenant_id, key_id)
                );
                CREATE UNIQUE INDEX idx_signing_keys_one_active
                    ON signing_keys (tenant_id) WHERE is_active = 1;

                CREATE TABLE views (
                    tenant_id TEXT NOT NULL,
                    view_id TEXT NOT NULL,
                    catalog_id TEXT NOT NULL,
                    label TEXT NOT NULL,
                    rules_json TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    PRIMARY KEY (tenant_id, view_id),
                    UNIQUE (tenant_id, catalog_id, label)
                );

                CREATE TABLE sessions (
                    session_id TEXT PRIMARY KEY,
                    skillset_path TEXT NOT NULL,
                    skill TEXT NOT NULL,
                    view_id TEXT NOT NULL,
                    view_definition_snapshot_json TEXT NOT NULL,
                    variables_json TEXT NOT NULL,
                    input_args_json TEXT NOT NULL,
                    status_summary TEXT NOT NULL,
                    user_id TEXT NOT NULL,
                    catalog_id TEXT NOT NULL,
                    variant_id TEXT NOT NULL,
                    started_at TEXT NOT NULL,
                    ended_at TEXT,
                    expires_at TEXT NOT NULL
                );

                CREATE TABLE catalogs (
                    tenant_id TEXT NOT NULL,
                    catalog_id TEXT NOT NULL,
                    name TEXT NOT NULL,
                    PRIMARY KEY (tenant_id, catalog_id),
                    UNIQUE (tenant_id, name)
                );

                CREATE TABLE variants (
                    tenant_id TEXT NOT NULL,
                    variant_id TEXT NOT NULL,
                    catalog_id TEXT NOT NULL,
                    name TEXT NOT NULL,
                    PRIMARY KEY (tenant_id, variant_id),
                    UNIQUE (tenant_id, catalog_id, name)
                );

                CREATE TABLE namespaces (
                    tenant_id TEXT NOT NULL,
                    namespace_id TEXT NOT NULL,
                    variant_id TEXT NOT NULL,
                    name TEXT NOT NULL,
                    PRIMARY KEY (tenant_id, namespace_id),
                    UNIQUE (tenant_id, variant_id, name)
                );",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!("unsupported schema version: {value}")));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed persistence for signing keys, views, sessions, and
/// catalog-hierarchy name resolution.
#[derive(Clone)]
pub struct SqliteStore {
    /// The guarded connection; all access is serialized through this mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (creating if necessary) the store at `config.path`, applying
    /// pragmas and initializing or validating the schema.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when the path is invalid, the database
    /// cannot be opened, or the schema is at an unsupported version.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_path(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("store connection lock poisoned".to_string()))
    }

    /// Registers a catalog name for resolution; used by bootstrap/test
    /// fixtures, since declarative catalog CRUD is out of core scope.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::Conflict`] when the name already exists
    /// for this tenant.
    pub fn insert_catalog(&self, tenant_id: &TenantId, catalog_id: CatalogId, name: &str) -> Result<(), SqliteStoreError> {
        let connection = self.lock()?;
        connection
            .execute(
                "INSERT INTO catalogs (tenant_id, catalog_id, name) VALUES (?1, ?2, ?3)",
                params![tenant_id.as_str(), catalog_id.to_string(), name],
            )
            .map_err(map_db_err)?;
        Ok(())
    }

    /// Registers a variant name within a catalog.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::Conflict`] when the name already exists
    /// for this `(tenant_id, catalog_id)`.
    pub fn insert_variant(
        &self,
        tenant_id: &TenantId,
        variant_id: VariantId,
        catalog_id: &CatalogId,
        name: &str,
    ) -> Result<(), SqliteStoreError> {
        let connection = self.lock()?;
        connection
            .execute(
                "INSERT INTO variants (tenant_id, variant_id, catalog_id, name) VALUES (?1, ?2, ?3, ?4)",
                params![tenant_id.as_str(), variant_id.to_string(), catalog_id.to_string(), name],
            )
            .map_err(map_db_err)?;
        Ok(())
    }

    /// Registers a namespace name within a variant.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError::Conflict`] when the name already exists
    /// for this `(tenant_id, variant_id)`.
    pub fn insert_namespace(
        &self,
        tenant_id: &TenantId,
        namespace_id: NamespaceId,
        variant_id: &VariantId,
        name: &str,
    ) -> Result<(), SqliteStoreError> {
        let connection = self.lock()?;
        connection
            .execute(
                "INSERT INTO namespaces (tenant_id, namespace_id, variant_id, name) VALUES (?1, ?2, ?3, ?4)",
                params![tenant_id.as_str(), namespace_id.to_string(), variant_id.to_string(), name],
            )
            .map_err(map_db_err)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: SigningKeyRepository
// ============================================================================

impl SigningKeyRepository for SqliteStore {
    fn load_active(&self, tenant_id: &TenantId) -> Result<Option<SigningKey>, RepositoryError> {
        let connection = self.lock()?;
        let key = connection
            .query_row(
                "SELECT key_id, public_key, encrypted_private_key, is_active, created_at, expires_at
                 FROM signing_keys WHERE tenant_id = ?1 AND is_active = 1",
                params![tenant_id.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Vec<u8>>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                        row.get::<_, bool>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                },
            )
            .optional()
            .map_err(map_db_err)?;
        let Some((key_id, public_key, encrypted_private_key, is_active, created_at, expires_at)) = key else {
            return Ok(None);
        };
        let key_id: SigningKeyId = key_id.parse().map_err(|_| SqliteStoreError::Invalid("stored key_id is not a valid uuid".to_string()))?;
        let created_at = parse_timestamp(&created_at)?;
        let expires_at = expires_at.map(|value| parse_timestamp(&value)).transpose()?;
        Ok(Some(SigningKey {
            key_id,
            tenant_id: tenant_id.clone(),
            public_key,
            encrypted_private_key,
            is_active,
            created_at,
            expires_at,
        }))
    }

    fn insert_active(&self, key: &SigningKey) -> Result<(), RepositoryError> {
        let mut connection = self.lock()?;
        let tx = connection.transaction().map_err(map_db_err)?;
        tx.execute("UPDATE signing_keys SET is_active = 0 WHERE tenant_id = ?1", params![key.tenant_id.as_str()])
            .map_err(map_db_err)?;
        tx.execute(
            "INSERT INTO signing_keys
             (tenant_id, key_id, public_key, encrypted_private_key, is_active, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)",
            params![
                key.tenant_id.as_str(),
                key.key_id.to_string(),
                key.public_key,
                key.encrypted_private_key,
                format_timestamp(key.created_at)?,
                key.expires_at.map(format_timestamp).transpose()?,
            ],
        )
        .map_err(map_db_err)?;
        tx.commit().map_err(map_db_err)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: ViewRepository
// ============================================================================

/// Deserializes a view row into a [`View`].
fn row_to_view(
    tenant_id: &TenantId,
    view_id: String,
    catalog_id: String,
    label: String,
    rules_json: String,
    created_at: String,
) -> Result<View, SqliteStoreError> {
    let view_id: ViewId = view_id.parse().map_err(|_| SqliteStoreError::Invalid("stored view_id is not a valid uuid".to_string()))?;
    let catalog_id: CatalogId = catalog_id.parse().map_err(|_| SqliteStoreError::Invalid("stored catalog_id is not a valid uuid".to_string()))?;
    let rules: ViewDefinition = serde_json::from_str(&rules_json).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    let created_at = parse_timestamp(&created_at)?;
    Ok(View {
        view_id,
        label,
        catalog_id,
        rules,
        tenant_id: tenant_id.clone(),
        created_at,
    })
}

impl ViewRepository for SqliteStore {
    fn get_by_label(&self, tenant_id: &TenantId, catalog_id: &CatalogId, label: &str) -> Result<Option<View>, RepositoryError> {
        let connection = self.lock()?;
        let row = connection
            .query_row(
                "SELECT view_id, catalog_id, label, rules_json, created_at
                 FROM views WHERE tenant_id = ?1 AND catalog_id = ?2 AND label = ?3",
                params![tenant_id.as_str(), catalog_id.to_string(), label],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()
            .map_err(map_db_err)?;
        let Some((view_id, catalog_id, label, rules_json, created_at)) = row else {
            return Ok(None);
        };
        Ok(Some(row_to_view(tenant_id, view_id, catalog_id, label, rules_json, created_at)?))
    }

    fn get_by_id(&self, tenant_id: &TenantId, view_id: &ViewId) -> Result<Option<View>, RepositoryError> {
        let connection = self.lock()?;
        let row = connection
            .query_row(
                "SELECT view_id, catalog_id, label, rules_json, created_at
                 FROM views WHERE tenant_id = ?1 AND view_id = ?2",
                params![tenant_id.as_str(), view_id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()
            .map_err(map_db_err)?;
        let Some((view_id, catalog_id, label, rules_json, created_at)) = row else {
            return Ok(None);
        };
        Ok(Some(row_to_view(tenant_id, view_id, catalog_id, label, rules_json, created_at)?))
    }

    fn insert(&self, view: &View) -> Result<(), RepositoryError> {
        let connection = self.lock()?;
        let rules_json = serde_json::to_string(&view.rules).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        connection
            .execute(
                "INSERT INTO views (tenant_id, view_id, catalog_id, label, rules_json, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    view.tenant_id.as_str(),
                    view.view_id.to_string(),
                    view.catalog_id.to_string(),
                    view.label,
                    rules_json,
                    format_timestamp(view.created_at)?,
                ],
            )
            .map_err(map_db_err)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: SessionRepository
// ============================================================================

impl SessionRepository for SqliteStore {
    fn insert(&self, session: &Session) -> Result<(), RepositoryError> {
        let connection = self.lock()?;
        let view_definition_snapshot_json =
            serde_json::to_string(&session.view_definition_snapshot).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let variables_json = serde_json::to_string(&session.variables).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let input_args_json = serde_json::to_string(&session.input_args).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let status_json = serde_json::to_string(&session.status_summary).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        connection
            .execute(
                "INSERT INTO sessions
                 (session_id, skillset_path, skill, view_id, view_definition_snapshot_json,
                  variables_json, input_args_json, status_summary, user_id, catalog_id, variant_id,
                  started_at, ended_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    session.session_id.to_string(),
                    session.skillset_path,
                    session.skill,
                    session.view_id.to_string(),
                    view_definition_snapshot_json,
                    variables_json,
                    input_args_json,
                    status_json,
                    session.user_id,
                    session.catalog_id.to_string(),
                    session.variant_id.to_string(),
                    format_timestamp(session.started_at)?,
                    session.ended_at.map(format_timestamp).transpose()?,
                    format_timestamp(session.expires_at)?,
                ],
            )
            .map_err(map_db_err)?;
        Ok(())
    }

    fn get(&self, session_id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        let connection = self.lock()?;
        let row = connection
            .query_row(
                "SELECT skillset_path, skill, view_id, view_definition_snapshot_json,
                        variables_json, input_args_json, status_summary, user_id, catalog_id,
                        variant_id, started_at, ended_at, expires_at
                 FROM sessions WHERE session_id = ?1",
                params![session_id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                        row.get::<_, String>(7)?,
                        row.get::<_, String>(8)?,
                        row.get::<_, String>(9)?,
                        row.get::<_, String>(10)?,
                        row.get::<_, Option<String>>(11)?,
                        row.get::<_, String>(12)?,
                    ))
                },
            )
            .optional()
            .map_err(map_db_err)?;
        let Some((
            skillset_path,
            skill,
            view_id,
            view_definition_snapshot_json,
            variables_json,
            input_args_json,
            status_json,
            user_id,
            catalog_id,
            variant_id,
            started_at,
            ended_at,
            expires_at,
        )) = row
        else {
            return Ok(None);
        };
        let view_id: ViewId = view_id.parse().map_err(|_| SqliteStoreError::Invalid("stored view_id is not a valid uuid".to_string()))?;
        let catalog_id: CatalogId =
            catalog_id.parse().map_err(|_| SqliteStoreError::Invalid("stored catalog_id is not a valid uuid".to_string()))?;
        let variant_id: VariantId =
            variant_id.parse().map_err(|_| SqliteStoreError::Invalid("stored variant_id is not a valid uuid".to_string()))?;
        let view_definition_snapshot: ViewDefinition =
            serde_json::from_str(&view_definition_snapshot_json).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let variables = serde_json::from_str(&variables_json).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let input_args = serde_json::from_str(&input_args_json).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let status_summary: SessionStatus = serde_json::from_str(&status_json).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let started_at = parse_timestamp(&started_at)?;
        let ended_at = ended_at.map(|value| parse_timestamp(&value)).transpose()?;
        let expires_at = parse_timestamp(&expires_at)?;
        Ok(Some(Session {
            session_id: *session_id,
            skillset_path,
            skill,
            view_id,
            view_definition_snapshot,
            variables,
            input_args,
            status_summary,
            user_id,
            catalog_id,
            variant_id,
            started_at,
            ended_at,
            expires_at,
        }))
    }

    fn set_status_summary(&self, session_id: &SessionId, status: SessionStatus) -> Result<(), RepositoryError> {
        let connection = self.lock()?;
        let status_json = serde_json::to_string(&status).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let rows = connection
            .execute("UPDATE sessions SET status_summary = ?1 WHERE session_id = ?2", params![status_json, session_id.to_string()])
            .map_err(map_db_err)?;
        if rows == 0 {
            return Err(RepositoryError::Invalid(format!("no session {session_id} to update")));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: CatalogNameResolver
// ============================================================================

impl CatalogNameResolver for SqliteStore {
    fn resolve_catalog(&self, tenant_id: &TenantId, name: &str) -> Result<Option<CatalogId>, RepositoryError> {
        let connection = self.lock()?;
        let id: Option<String> = connection
            .query_row(
                "SELECT catalog_id FROM catalogs WHERE tenant_id = ?1 AND name = ?2",
                params![tenant_id.as_str(), name],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_db_err)?;
        id.map(|id| id.parse().map_err(|_| RepositoryError::Invalid("stored catalog_id is not a valid uuid".to_string())))
            .transpose()
    }

    fn resolve_variant(&self, tenant_id: &TenantId, catalog_id: &CatalogId, name: &str) -> Result<Option<VariantId>, RepositoryError> {
        let connection = self.lock()?;
        let id: Option<String> = connection
            .query_row(
                "SELECT variant_id FROM variants WHERE tenant_id = ?1 AND catalog_id = ?2 AND name = ?3",
                params![tenant_id.as_str(), catalog_id.to_string(), name],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_db_err)?;
        id.map(|id| id.parse().map_err(|_| RepositoryError::Invalid("stored variant_id is not a valid uuid".to_string())))
            .transpose()
    }

    fn resolve_namespace(&self, tenant_id: &TenantId, variant_id: &VariantId, name: &str) -> Result<Option<NamespaceId>, RepositoryError> {
        let connection = self.lock()?;
        let id: Option<String> = connection
            .query_row(
                "SELECT namespace_id FROM namespaces WHERE tenant_id = ?1 AND variant_id = ?2 AND name = ?3",
                params![tenant_id.as_str(), variant_id.to_string(), name],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_db_err)?;
        id.map(|id| id.parse().map_err(|_| RepositoryError::Invalid("stored namespace_id is not a valid uuid".to_string())))
            .transpose()
    }
}
