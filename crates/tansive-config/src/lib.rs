// crates/tansive-config/src/lib.rs
// ============================================================================
// Crate: tansive-config
// Description: TOML configuration model, loading, and validation.
// Purpose: Give the server one authoritative, fail-closed config surface.
// Dependencies: serde, tansive-core, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is a single TOML file, loaded and validated once at
//! startup. Loading is strict: an unreadable path, an oversized file, or
//! non-UTF-8 bytes are all load errors distinct from a TOML syntax error,
//! so operators get field-level context instead of a generic parse failure.

pub mod duration;

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use tansive_core::core::ProjectId;
use tansive_core::core::TenantId;

/// Config files larger than this are rejected before parsing.
const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576;
/// Config paths longer than this are rejected before the filesystem is touched.
const MAX_CONFIG_PATH_LEN: usize = 4_096;
/// Individual path components longer than this are rejected.
const MAX_CONFIG_PATH_COMPONENT_LEN: usize = 255;

/// The config format version this crate understands.
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config path exceeds [`MAX_CONFIG_PATH_LEN`].
    #[error("config path exceeds max length")]
    PathTooLong,
    /// A single path component exceeds [`MAX_CONFIG_PATH_COMPONENT_LEN`].
    #[error("config path component too long")]
    PathComponentTooLong,
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(String),
    /// The config file exceeds [`MAX_CONFIG_FILE_BYTES`].
    #[error("config file exceeds size limit")]
    TooLarge,
    /// The config file is not valid UTF-8.
    #[error("config file must be utf-8")]
    NotUtf8,
    /// The config file is not valid TOML, or doesn't match the expected shape.
    #[error("failed to parse config: {0}")]
    Parse(String),
    /// A duration-shaped field's value was not `<n>{m,h,d,y}`.
    #[error("invalid duration value: {0}")]
    InvalidDuration(String),
    /// A structural or cross-field validation rule was violated.
    #[error("{0}")]
    Invalid(String),
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database user.
    pub user: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub dbname: String,
    /// TLS mode, passed through to the driver unvalidated beyond non-emptiness.
    pub sslmode: String,
}

/// Authentication and token-minting settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfigRaw {
    /// Duration string; the maximum age a token's `iat` may have at validation time.
    pub max_token_age: String,
    /// Duration string; permitted clock skew on `nbf`/`exp` checks.
    pub clock_skew: String,
    /// Duration string; the default lifetime minted tokens are given.
    pub default_token_validity: String,
    /// A fixed bearer token accepted in place of normal authentication, for
    /// single-user deployments only.
    #[serde(default)]
    pub fake_single_user_token: Option<String>,
}

/// Session lifecycle settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfigRaw {
    /// Duration string; how long an idle session remains valid.
    pub expiration_time: String,
    /// Maximum number of entries a session's variable bag may hold.
    pub max_variables: u32,
}

/// The raw, as-parsed-from-TOML configuration shape; duration fields are
/// still strings here, validated and converted by [`Config::load`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRaw {
    /// The config schema version this file was authored against.
    pub format_version: u32,
    /// The port the HTTP server binds.
    pub server_port: u16,
    /// Authentication and token settings.
    pub auth: AuthConfigRaw,
    /// Session lifecycle settings.
    pub session: SessionConfigRaw,
    /// Database connection settings.
    pub db: DbConfig,
    /// When `true`, the server runs without per-request authentication,
    /// granting every request a preset admin view.
    #[serde(default)]
    pub single_user_mode: bool,
    /// Tenant every request is scoped to in single-user mode.
    #[serde(default)]
    pub default_tenant_id: Option<String>,
    /// Project every request is scoped to in single-user mode.
    #[serde(default)]
    pub default_project_id: Option<String>,
}

/// Authentication and token-minting settings, with durations parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// The maximum age a token's `iat` may have at validation time.
    pub max_token_age: std::time::Duration,
    /// Permitted clock skew on `nbf`/`exp` checks.
    pub clock_skew: std::time::Duration,
    /// The default lifetime minted tokens are given.
    pub default_token_validity: std::time::Duration,
    /// A fixed bearer token accepted in place of normal authentication.
    pub fake_single_user_token: Option<String>,
}

/// Session lifecycle settings, with durations parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long an idle session remains valid.
    pub expiration_time: std::time::Duration,
    /// Maximum number of entries a session's variable bag may hold.
    pub max_variables: u32,
}

/// The fully loaded and validated server configuration.
///
/// # Invariants
/// - `format_version` equals [`SUPPORTED_FORMAT_VERSION`].
/// - `default_tenant_id`/`default_project_id` are `Some` whenever
///   `single_user_mode` is `true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The config schema version this file was authored against.
    pub format_version: u32,
    /// The port the HTTP server binds.
    pub server_port: u16,
    /// Authentication and token settings.
    pub auth: AuthConfig,
    /// Session lifecycle settings.
    pub session: SessionConfig,
    /// Database connection settings.
    pub db: DbConfig,
    /// When `true`, the server runs without per-request authentication.
    pub single_user_mode: bool,
    /// Tenant every request is scoped to in single-user mode.
    pub default_tenant_id: Option<TenantId>,
    /// Project every request is scoped to in single-user mode.
    pub default_project_id: Option<ProjectId>,
}

impl Config {
    /// Loads and validates configuration from a TOML file at `path`.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the path is malformed, the file cannot
    /// be read, is oversized, is not UTF-8, fails to parse, or fails
    /// cross-field validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = Self::read_to_string(path)?;
        let parsed: ConfigRaw = toml::from_str(&raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        Self::from_raw(parsed)
    }

    /// Converts an already-parsed [`ConfigRaw`] into a validated [`Config`].
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a duration field fails to parse or a
    /// cross-field validation rule is violated.
    pub fn from_raw(raw: ConfigRaw) -> Result<Self, ConfigError> {
        if raw.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported format_version {}, expected {SUPPORTED_FORMAT_VERSION}",
                raw.format_version
            )));
        }

        let auth = AuthConfig {
            max_token_age: duration::parse_duration(&raw.auth.max_token_age)?,
            clock_skew: duration::parse_duration(&raw.auth.clock_skew)?,
            default_token_validity: duration::parse_duration(&raw.auth.default_token_validity)?,
            fake_single_user_token: raw.auth.fake_single_user_token,
        };
        if auth.default_token_validity > auth.max_token_age {
            return Err(ConfigError::Invalid(
                "auth.default_token_validity must not exceed auth.max_token_age".to_string(),
            ));
        }

        let session = SessionConfig {
            expiration_time: duration::parse_duration(&raw.session.expiration_time)?,
            max_variables: raw.session.max_variables,
        };
        if session.max_variables == 0 {
            return Err(ConfigError::Invalid("session.max_variables must be greater than zero".to_string()));
        }

        if raw.db.host.is_empty() || raw.db.user.is_empty() || raw.db.dbname.is_empty() || raw.db.sslmode.is_empty() {
            return Err(ConfigError::Invalid("db.host, db.user, db.dbname, and db.sslmode must not be empty".to_string()));
        }

        let default_tenant_id = raw
            .default_tenant_id
            .map(|id| TenantId::new(id).map_err(|err| ConfigError::Invalid(err.to_string())))
            .transpose()?;
        let default_project_id = raw
            .default_project_id
            .map(|id| ProjectId::new(id).map_err(|err| ConfigError::Invalid(err.to_string())))
            .transpose()?;

        if raw.single_user_mode && (default_tenant_id.is_none() || default_project_id.is_none()) {
            return Err(ConfigError::Invalid(
                "single_user_mode requires default_tenant_id and default_project_id".to_string(),
            ));
        }

        Ok(Self {
            format_version: raw.format_version,
            server_port: raw.server_port,
            auth,
            session,
            db: raw.db,
            single_user_mode: raw.single_user_mode,
            default_tenant_id,
            default_project_id,
        })
    }

    /// Reads `path` into a string, enforcing path-length, size, and
    /// encoding guards before the TOML parser ever sees the content.
    fn read_to_string(path: &Path) -> Result<String, ConfigError> {
        let path_str = path.to_string_lossy();
        if path_str.len() > MAX_CONFIG_PATH_LEN {
            return Err(ConfigError::PathTooLong);
        }
        for component in path.components() {
            if component.as_os_str().len() > MAX_CONFIG_PATH_COMPONENT_LEN {
                return Err(ConfigError::PathComponentTooLong);
            }
        }

        let metadata = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_FILE_BYTES {
            return Err(ConfigError::TooLarge);
        }

        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        String::from_utf8(bytes).map_err(|_err| ConfigError::NotUtf8)
    }
}
