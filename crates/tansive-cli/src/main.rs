// crates/tansive-cli/src/main.rs
// ============================================================================
// Module: Tansive CLI Entry Point
// Description: Command dispatcher for serving the control plane and for
//              offline operator tooling.
// Purpose: Provide a safe, localized CLI for running and debugging Tansive.
// Dependencies: axum, clap, tansive-config, tansive-core, tansive-crypto,
//               tansive-policy, tansive-server, tansive-store-sqlite, tokio
// ============================================================================

//! ## Overview
//! The Tansive CLI exposes three subcommands: `serve` runs the HTTP control
//! plane, `keys show-active` inspects (and lazily mints) a tenant's signing
//! key, and `policy check` evaluates a view definition against an action and
//! target offline, without a running server. All user-facing strings are
//! routed through the i18n catalog to prepare for future localization.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod i18n;
mod serve_policy;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use i18n::Locale;
use i18n::set_locale;
use tansive_config::Config;
use tansive_core::core::Action;
use tansive_core::core::TargetResource;
use tansive_core::core::TenantId;
use tansive_core::core::ViewDefinition;
use tansive_crypto::SigningKeyStore;
use tansive_crypto::key_encryption::local_dev_passphrase;
use tansive_policy::is_authorized;
use tansive_server::AppState;
use tansive_server::build_router;
use tansive_store_sqlite::SqliteStore;
use tansive_store_sqlite::SqliteStoreConfig;

use crate::serve_policy::enforce_local_only;
use crate::serve_policy::resolve_allow_non_loopback;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable overriding the CLI's output locale.
const LANG_ENV: &str = "TANSIVE_LANG";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "tansive", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `TANSIVE_LANG`).
    #[arg(long, value_name = "LANG", global = true)]
    lang: Option<String>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Tansive HTTP control plane.
    Serve(ServeCommand),
    /// Signing-key operator commands.
    Keys {
        /// Selected keys subcommand.
        #[command(subcommand)]
        command: KeysCommand,
    },
    /// Offline policy-engine debugging commands.
    Policy {
        /// Selected policy subcommand.
        #[command(subcommand)]
        command: PolicyCommand,
    },
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Path to the server's TOML config file.
    #[arg(long, value_name = "PATH")]
    config: PathBuf,
    /// Allow binding the HTTP listener to a non-loopback address.
    #[arg(long, action = ArgAction::SetTrue)]
    allow_non_loopback: bool,
}

/// Signing-key subcommands.
#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Print the active signing key, generating one on first run.
    ShowActive(KeysShowActiveCommand),
}

/// Configuration for `keys show-active`.
#[derive(Args, Debug)]
struct KeysShowActiveCommand {
    /// Path to the server's TOML config file.
    #[arg(long, value_name = "PATH")]
    config: PathBuf,
    /// Tenant to show the active signing key for (defaults to the config's
    /// `default_tenant_id` in single-user mode).
    #[arg(long, value_name = "TENANT_ID")]
    tenant: Option<String>,
}

/// Policy subcommands.
#[derive(Subcommand, Debug)]
enum PolicyCommand {
    /// Evaluate an action/target pair against a view definition file.
    Check(PolicyCheckCommand),
}

/// Configuration for `policy check`.
#[derive(Args, Debug)]
struct PolicyCheckCommand {
    /// Path to the server's TOML config file (kept for a uniform CLI surface
    /// across subcommands; this command does not touch the store).
    #[arg(long, value_name = "PATH")]
    config: PathBuf,
    /// Action to evaluate, e.g. `resource.read`.
    #[arg(long)]
    action: Action,
    /// Target resource URI, e.g. `res://catalog/c/resource/file`.
    #[arg(long)]
    target: String,
    /// Path to a RON- or JSON-authored view definition file.
    #[arg(long, value_name = "PATH")]
    rules: PathBuf,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang.as_deref(), env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated")).map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version)).map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        write_stdout_line("Usage: tansive <serve|keys|policy> ...").map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Keys {
            command,
        } => command_keys(command),
        Commands::Policy {
            command,
        } => command_policy(command),
    }
}

/// Resolves the active locale from the `--lang` flag, the environment, then
/// the English default.
fn resolve_locale(lang_flag: Option<&str>, lang_env: Option<&str>) -> CliResult<Locale> {
    if let Some(value) = lang_flag {
        return Locale::parse(value).ok_or_else(|| CliError::new(t!("i18n.lang.invalid_env", env = "--lang", value = value)));
    }
    if let Some(value) = lang_env {
        return Locale::parse(value).ok_or_else(|| CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value)));
    }
    Ok(Locale::En)
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = Config::load(&command.config).map_err(|err| CliError::new(t!("serve.config.load_failed", error = err)))?;
    let allow_non_loopback = resolve_allow_non_loopback(command.allow_non_loopback).map_err(|err| CliError::new(err.to_string()))?;
    let bind_outcome = enforce_local_only(&config, allow_non_loopback).map_err(|err| CliError::new(err.to_string()))?;

    if config.single_user_mode {
        write_stderr_line(&t!("serve.warn.single_user_mode")).map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    let passphrase = local_dev_passphrase();
    let state = AppState::build(config, passphrase).map_err(|err| CliError::new(t!("serve.init_failed", error = err)))?;
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_outcome.bind_addr)
        .await
        .map_err(|err| CliError::new(t!("serve.init_failed", error = err)))?;
    write_stdout_line(&t!("serve.listening", addr = bind_outcome.bind_addr)).map_err(|err| CliError::new(output_error("stdout", &err)))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| CliError::new(t!("serve.failed", error = err)))?;

    Ok(ExitCode::SUCCESS)
}

/// Waits for a Ctrl+C (or, on Unix, SIGTERM) shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let Ok(mut signal) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) else {
            return;
        };
        signal.recv().await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

// ============================================================================
// SECTION: Keys Command
// ============================================================================

/// Executes the `keys` command.
fn command_keys(command: KeysCommand) -> CliResult<ExitCode> {
    match command {
        KeysCommand::ShowActive(command) => command_keys_show_active(&command),
    }
}

/// Executes `keys show-active`.
fn command_keys_show_active(command: &KeysShowActiveCommand) -> CliResult<ExitCode> {
    let config = Config::load(&command.config).map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let tenant_raw = command.tenant.as_deref().or_else(|| config.default_tenant_id.as_ref().map(TenantId::as_str));
    let Some(tenant_raw) = tenant_raw else {
        return Err(CliError::new(t!("keys.show_active.tenant_required")));
    };
    let tenant_id = TenantId::new(tenant_raw).map_err(|err| CliError::new(err.to_string()))?;

    let store_config = SqliteStoreConfig::new(config.db.dbname.clone());
    let store = SqliteStore::open(&store_config).map_err(|err| CliError::new(t!("keys.show_active.failed", error = err)))?;
    let signing_keys = SigningKeyStore::new(store, local_dev_passphrase());
    let key = signing_keys.get_active_key(&tenant_id).map_err(|err| CliError::new(t!("keys.show_active.failed", error = err)))?;

    write_stdout_line(&t!("keys.show_active.header")).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line(&t!("keys.show_active.key_id", key_id = key.key_id)).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line(&t!("keys.show_active.tenant", tenant_id = key.tenant_id)).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line(&t!("keys.show_active.public_key", public_key = BASE64.encode(&key.public_key)))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line(&t!("keys.show_active.created_at", created_at = key.created_at)).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    let expires_at = key.expires_at.map_or_else(|| t!("keys.show_active.expires_at.none"), |value| value.to_string());
    write_stdout_line(&t!("keys.show_active.expires_at", expires_at = expires_at)).map_err(|err| CliError::new(output_error("stdout", &err)))?;

    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Policy Command
// ============================================================================

/// Executes the `policy` command.
fn command_policy(command: PolicyCommand) -> CliResult<ExitCode> {
    match command {
        PolicyCommand::Check(command) => command_policy_check(&command),
    }
}

/// Executes `policy check`.
fn command_policy_check(command: &PolicyCheckCommand) -> CliResult<ExitCode> {
    let _config = Config::load(&command.config).map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;

    let raw = fs::read_to_string(&command.rules)
        .map_err(|err| CliError::new(t!("policy.check.rules_read_failed", path = command.rules.display(), error = err)))?;
    let view = parse_view_definition(&command.rules, &raw)
        .map_err(|err| CliError::new(t!("policy.check.rules_parse_failed", path = command.rules.display(), error = err)))?;

    let target = TargetResource::parse(&command.target)
        .map_err(|err| CliError::new(t!("policy.check.target_invalid", target = &command.target, error = err)))?;

    let allowed = is_authorized(&view, command.action, &target);
    let decision = if allowed { t!("policy.check.result.allow") } else { t!("policy.check.result.deny") };
    write_stdout_line(&t!("policy.check.result", action = command.action.as_str(), target = &command.target, decision = decision))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;

    Ok(ExitCode::SUCCESS)
}

/// Parses a [`ViewDefinition`] authored as RON or JSON, detected from the
/// file extension (defaulting to RON).
fn parse_view_definition(path: &Path, raw: &str) -> Result<ViewDefinition, String> {
    if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
        return serde_json::from_str(raw).map_err(|err| err.to_string());
    }
    ron::from_str(raw).map_err(|err| err.to_string())
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
