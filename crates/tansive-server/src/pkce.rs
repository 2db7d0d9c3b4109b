// crates/tansive-server/src/pkce.rs
// ============================================================================
// Module: PKCE Auth-Code Store
// Description: In-memory, single-use authorization code store for session code exchange.
// Purpose: Implement component 4.C.
// Dependencies: tansive-core, rand, sha2, base64
// ============================================================================

//! ## Overview
//! [`AuthCodeStore`] issues short-lived, single-use authorization codes that
//! bind a session to a PKCE code challenge. A worker later exchanges the
//! code plus the matching code verifier for a session-scoped bearer token.
//! Explicitly scoped to single-instance deployments (component 4.C):
//! nothing here is shared across processes.

use std::collections::HashMap;
use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Digest;
use sha2::Sha256;
use tansive_core::core::AuthCodeMetadata;
use tansive_core::core::SessionId;
use thiserror::Error;
use time::Duration;
use time::OffsetDateTime;

/// Number of random bytes drawn for a new authorization code (encodes to 43
/// base64url characters).
const CODE_BYTES: usize = 32;

/// How long an issued authorization code remains redeemable.
const CODE_TTL: Duration = Duration::minutes(10);

/// Maximum attempts to draw a code that does not collide with an existing
/// one before giving up.
const MAX_ISSUE_ATTEMPTS: usize = 8;

/// Failures from issuing or redeeming an authorization code.
#[derive(Debug, Error)]
pub enum AuthCodeError {
    /// Code generation could not find a non-colliding value.
    #[error("failed to allocate a unique authorization code")]
    ExhaustedAttempts,
    /// No such code is outstanding, or it already expired.
    #[error("authorization code not found or expired")]
    NotFound,
    /// The presented code verifier did not match the stored challenge.
    #[error("code verifier does not match the code challenge")]
    VerifierMismatch,
}

/// In-memory, mutex-guarded store of outstanding authorization codes.
///
/// # Invariants
/// - A code is removed from the map the moment it is looked up, whether or
///   not the verifier matches; the store never reuses a code it has
///   already returned from [`AuthCodeStore::redeem`].
pub struct AuthCodeStore {
    /// Outstanding codes, keyed by the code string itself.
    codes: Mutex<HashMap<String, AuthCodeMetadata>>,
}

impl Default for AuthCodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthCodeStore {
    /// Builds an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            codes: Mutex::new(HashMap::new()),
        }
    }

    /// Issues a new authorization code binding `session_id` to
    /// `code_challenge` (the base64url SHA-256 digest of the verifier the
    /// caller will later present).
    ///
    /// # Errors
    /// Returns [`AuthCodeError::ExhaustedAttempts`] if a non-colliding code
    /// could not be drawn within a bounded number of attempts.
    pub fn issue(&self, session_id: SessionId, code_challenge: String) -> Result<String, AuthCodeError> {
        let now = OffsetDateTime::now_utc();
        let metadata = AuthCodeMetadata {
            session_id,
            code_challenge,
            expires_at: now + CODE_TTL,
        };

        let mut codes = self.codes.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        for _ in 0..MAX_ISSUE_ATTEMPTS {
            let code = generate_code();
            if let std::collections::hash_map::Entry::Vacant(entry) = codes.entry(code.clone()) {
                entry.insert(metadata);
                return Ok(code);
            }
        }
        Err(AuthCodeError::ExhaustedAttempts)
    }

    /// Atomically looks up and deletes `code`, then validates `code_verifier`
    /// against the stored challenge.
    ///
    /// The code is consumed even when the verifier does not match, to
    /// prevent brute-force guessing of the verifier against a live code.
    ///
    /// # Errors
    /// Returns [`AuthCodeError::NotFound`] when the code is absent or
    /// expired, or [`AuthCodeError::VerifierMismatch`] when the verifier
    /// does not hash to the stored challenge.
    pub fn redeem(&self, code: &str, code_verifier: &str) -> Result<AuthCodeMetadata, AuthCodeError> {
        let metadata = {
            let mut codes = self.codes.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            codes.remove(code).ok_or(AuthCodeError::NotFound)?
        };

        if metadata.is_expired(OffsetDateTime::now_utc()) {
            return Err(AuthCodeError::NotFound);
        }

        let expected_challenge = challenge_for_verifier(code_verifier);
        if expected_challenge != metadata.code_challenge {
            return Err(AuthCodeError::VerifierMismatch);
        }

        Ok(metadata)
    }
}

/// Draws 32 random bytes and base64url-encodes them without padding.
fn generate_code() -> String {
    let mut bytes = [0u8; CODE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Computes `base64url(SHA-256(code_verifier))`, the PKCE `S256` challenge.
#[must_use]
pub fn challenge_for_verifier(code_verifier: &str) -> String {
    let digest = Sha256::digest(code_verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}
