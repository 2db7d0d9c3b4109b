// crates/tansive-cli/src/serve_policy.rs
// ============================================================================
// Module: Serve Policy
// Description: Network exposure policy checks for the CLI server launcher.
// Purpose: Enforce safe-by-default bind behavior with explicit opt-in.
// Dependencies: tansive-config, std
// ============================================================================

//! ## Overview
//! Provides safety checks for binding the HTTP server to non-loopback
//! addresses. The policy is fail-closed: explicit opt-in is required for a
//! non-loopback bind, and `single_user_mode` forbids network exposure
//! outright, since it grants every request an admin view with no
//! per-request authentication.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::net::SocketAddr;

use tansive_config::Config;

use crate::t;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable enabling non-loopback server binds.
pub const ALLOW_NON_LOOPBACK_ENV: &str = "TANSIVE_ALLOW_NON_LOOPBACK";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Bind outcome metadata for startup logging.
///
/// # Invariants
/// - `network_exposed` is `true` only when a non-loopback bind is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindOutcome {
    /// Socket address the server will bind.
    pub bind_addr: SocketAddr,
    /// True when the server is bound to a non-loopback address.
    pub network_exposed: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Serve policy failures for bind safety.
///
/// # Invariants
/// - Variants are stable for CLI error mapping and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServePolicyError {
    /// Environment variable was set to an invalid value.
    InvalidEnv {
        /// Raw environment value.
        value: String,
    },
    /// `single_user_mode` forbids non-loopback binding outright.
    SingleUserModeForbidsNonLoopback {
        /// Bind address.
        bind: SocketAddr,
    },
}

impl std::fmt::Display for ServePolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::InvalidEnv {
                value,
            } => {
                t!("serve.bind.allow_env_invalid", env = ALLOW_NON_LOOPBACK_ENV, value = value)
            }
            Self::SingleUserModeForbidsNonLoopback {
                bind,
            } => {
                t!("serve.bind.single_user_mode_forbidden", bind = bind)
            }
        };
        write!(f, "{message}")
    }
}

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Resolves the non-loopback opt-in flag from CLI and environment.
///
/// # Errors
/// Returns [`ServePolicyError::InvalidEnv`] when the environment value is invalid.
pub fn resolve_allow_non_loopback(flag: bool) -> Result<bool, ServePolicyError> {
    if flag {
        return Ok(true);
    }
    let Some(value) = env::var_os(ALLOW_NON_LOOPBACK_ENV) else {
        return Ok(false);
    };
    let value = value.to_string_lossy().to_string();
    parse_allow_non_loopback_value(&value)
}

/// Enforces local-only bind restrictions for the HTTP server.
///
/// Loopback-only binds (`127.0.0.1:<port>`) are always permitted. Any other
/// bind requires `allow_non_loopback`, and is refused outright when
/// `config.single_user_mode` is set.
///
/// # Errors
/// Returns [`ServePolicyError`] when configuration violates bind safety.
pub fn enforce_local_only(config: &Config, allow_non_loopback: bool) -> Result<BindOutcome, ServePolicyError> {
    let loopback_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), config.server_port);
    if !allow_non_loopback {
        return Ok(BindOutcome {
            bind_addr: loopback_addr,
            network_exposed: false,
        });
    }

    let bind_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.server_port);
    if config.single_user_mode {
        return Err(ServePolicyError::SingleUserModeForbidsNonLoopback {
            bind: bind_addr,
        });
    }
    Ok(BindOutcome {
        bind_addr,
        network_exposed: true,
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a bool-ish string (true/false/1/0/yes/no/on/off).
fn parse_boolish(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// Parses an env value for allow-non-loopback.
pub(crate) fn parse_allow_non_loopback_value(value: &str) -> Result<bool, ServePolicyError> {
    parse_boolish(value).map_or_else(
        || {
            Err(ServePolicyError::InvalidEnv {
                value: value.to_string(),
            })
        },
        Ok,
    )
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

    fn config(single_user_mode: bool) -> Config {
        let toml = format!(
            r#"
            format_version = 1
            server_port = 8443

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
            dbname = "tansive"
            sslmode = "require"

            single_user_mode = {single_user_mode}
            {ids}
            "#,
            ids = if single_user_mode { "default_tenant_id = \"T1\"\ndefault_project_id = \"P1\"" } else { "" }
        );
        let raw: tansive_config::ConfigRaw = toml::from_str(&toml).expect("valid toml");
        Config::from_raw(raw).expect("valid config")
    }

    #[test]
    fn loopback_bind_requires_no_opt_in() {
        let outcome = enforce_local_only(&config(false), false).unwrap();
        assert!(!outcome.network_exposed);
        assert!(outcome.bind_addr.ip().is_loopback());
    }

    #[test]
    fn single_user_mode_forbids_non_loopback_even_with_opt_in() {
        let err = enforce_local_only(&config(true), true).unwrap_err();
        assert!(matches!(err, ServePolicyError::SingleUserModeForbidsNonLoopback { .. }));
    }

    #[test]
    fn non_single_user_mode_allows_non_loopback_with_opt_in() {
        let outcome = enforce_local_only(&config(false), true).unwrap();
        assert!(outcome.network_exposed);
        assert!(!outcome.bind_addr.ip().is_loopback());
    }

    #[test]
    fn env_value_parsing_accepts_boolish_strings() {
        assert_eq!(parse_allow_non_loopback_value("yes"), Ok(true));
        assert_eq!(parse_allow_non_loopback_value("0"), Ok(false));
        assert!(parse_allow_non_loopback_value("maybe").is_err());
    }
}
