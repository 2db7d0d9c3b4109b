// crates/tansive-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Provides message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings for future localization support.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The Tansive CLI stores user-facing strings in a small translation
//! catalog to enforce consistent messaging and to prepare for future locales.
//! All runtime output should be routed through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
///
/// # Invariants
/// - Variants are stable for CLI parsing and catalog lookup.
/// - [`Locale::En`] is the default fallback locale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Catalan.
    Ca,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ca => "ca",
        }
    }

    /// Attempts to parse a locale value (case-insensitive, tolerant of region tags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let normalized = value.to_ascii_lowercase();
        let lang = normalized.split(['-', '_']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "ca" => Some(Self::Ca),
            _ => None,
        }
    }
}

/// Ordered list of supported CLI locales.
///
/// # Invariants
/// - Ordering is stable for deterministic presentation.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Ca];

/// A formatted message argument captured by the [`macro@crate::t`] macro.
///
/// # Invariants
/// - `key` matches a placeholder name without braces (for example, `path`).
/// - `value` is preformatted and should be safe for display.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Global locale selection for CLI output.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static English catalog entries loaded into the localized message bundle.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "tansive {version}"),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("serve.config.load_failed", "Failed to load config: {error}"),
    ("serve.bind.parse_failed", "Invalid bind address {bind}: {error}"),
    (
        "serve.bind.single_user_mode_forbidden",
        "Refusing to bind to non-loopback address {bind}: single_user_mode never permits network \
         exposure.",
    ),
    (
        "serve.bind.allow_env_invalid",
        "Invalid value for {env}: {value}. Expected true/false/1/0/yes/no/on/off.",
    ),
    ("serve.warn.single_user_mode", "Warning: running in single-user mode; every request is granted an admin view."),
    ("serve.listening", "Listening on {addr}"),
    ("serve.init_failed", "Failed to initialize server state: {error}"),
    ("serve.failed", "Server failed: {error}"),
    ("keys.passphrase.source.machine_id", "signing-key passphrase derived from /etc/machine-id"),
    ("keys.show_active.failed", "Failed to load or generate the active signing key: {error}"),
    ("keys.show_active.tenant_required", "Pass --tenant, or set default_tenant_id in the config for single_user_mode."),
    ("keys.show_active.header", "Active signing key:"),
    ("keys.show_active.key_id", "Key ID: {key_id}"),
    ("keys.show_active.tenant", "Tenant: {tenant_id}"),
    ("keys.show_active.public_key", "Public key (base64): {public_key}"),
    ("keys.show_active.created_at", "Created at: {created_at}"),
    ("keys.show_active.expires_at", "Expires at: {expires_at}"),
    ("keys.show_active.expires_at.none", "never"),
    ("policy.check.rules_read_failed", "Failed to read rules file at {path}: {error}"),
    ("policy.check.rules_parse_failed", "Failed to parse rules file at {path}: {error}"),
    ("policy.check.target_invalid", "Invalid target resource {target}: {error}"),
    ("policy.check.result.allow", "ALLOW"),
    ("policy.check.result.deny", "DENY"),
    ("policy.check.result", "{action} on {target}: {decision}"),
];

/// Static Catalan catalog entries loaded into the localized message bundle.
const CATALOG_CA: &[(&str, &str)] = &[
    ("main.version", "tansive {version}"),
    ("i18n.lang.invalid_env", "Valor no vàlid per a {env}: {value}. S'esperava 'en' o 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Nota: la sortida que no és en anglès està traduïda automàticament i pot ser inexacta.",
    ),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "sortida"),
    ("output.write_failed", "No s'ha pogut escriure a {stream}: {error}"),
    ("config.load_failed", "No s'ha pogut carregar la configuració: {error}"),
    ("serve.config.load_failed", "No s'ha pogut carregar la configuració: {error}"),
    ("serve.bind.parse_failed", "Adreça de bind no vàlida {bind}: {error}"),
    (
        "serve.bind.single_user_mode_forbidden",
        "Es rebutja bind a l'adreça no-loopback {bind}: single_user_mode mai permet exposició de \
         xarxa.",
    ),
    (
        "serve.bind.allow_env_invalid",
        "Valor no vàlid per a {env}: {value}. S'esperava true/false/1/0/yes/no/on/off.",
    ),
    (
        "serve.warn.single_user_mode",
        "Avís: executant-se en mode d'un sol usuari; cada sol·licitud rep una vista d'administrador.",
    ),
    ("serve.listening", "Escoltant a {addr}"),
    ("serve.init_failed", "No s'ha pogut inicialitzar l'estat del servidor: {error}"),
    ("serve.failed", "El servidor ha fallat: {error}"),
    ("keys.passphrase.source.machine_id", "la contrasenya de la clau de signatura prové de /etc/machine-id"),
    ("keys.show_active.failed", "No s'ha pogut carregar o generar la clau de signatura activa: {error}"),
    (
        "keys.show_active.tenant_required",
        "Passeu --tenant, o establiu default_tenant_id a la configuració per a single_user_mode.",
    ),
    ("keys.show_active.header", "Clau de signatura activa:"),
    ("keys.show_active.key_id", "ID de clau: {key_id}"),
    ("keys.show_active.tenant", "Tenant: {tenant_id}"),
    ("keys.show_active.public_key", "Clau pública (base64): {public_key}"),
    ("keys.show_active.created_at", "Creada el: {created_at}"),
    ("keys.show_active.expires_at", "Caduca el: {expires_at}"),
    ("keys.show_active.expires_at.none", "mai"),
    ("policy.check.rules_read_failed", "No s'ha pogut llegir el fitxer de regles a {path}: {error}"),
    ("policy.check.rules_parse_failed", "No s'ha pogut analitzar el fitxer de regles a {path}: {error}"),
    ("policy.check.target_invalid", "Recurs de destí no vàlid {target}: {error}"),
    ("policy.check.result.allow", "PERMET"),
    ("policy.check.result.deny", "DENEGA"),
    ("policy.check.result", "{action} sobre {target}: {decision}"),
];

/// Returns the message catalog for the requested locale.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_CA_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    match locale {
        Locale::En => CATALOG_EN_MAP.get_or_init(|| CATALOG_EN.iter().copied().collect()),
        Locale::Ca => CATALOG_CA_MAP.get_or_init(|| CATALOG_CA.iter().copied().collect()),
    }
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let locale = current_locale();
    let template = catalog_for(locale)
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
///
/// # Returns
///
/// A localized [`String`] with placeholders substituted.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
