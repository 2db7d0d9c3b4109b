// crates/tansive-crypto/src/key_encryption.rs
// ============================================================================
// Module: Tansive Key Encryption
// Description: Argon2id-derived AES-256-GCM envelope encryption for signing-key material.
// Purpose: Encrypt/decrypt a signing key's private half for at-rest storage.
// Dependencies: aes-gcm, argon2, rand, thiserror
// ============================================================================

//! ## Overview
//! The private half of a signing key is never stored in the clear. It is
//! encrypted with AES-256-GCM using a key derived from a passphrase and a
//! random 16-byte salt via Argon2id. The stored blob is
//! `salt(16) ‖ nonce(12) ‖ ciphertext ‖ tag(16)`; decryption fails closed on
//! any tag mismatch, never returning partial plaintext.
//!
//! In the absence of a configured passphrase, [`local_dev_passphrase`]
//! derives one from a per-machine identifier. This fallback is reproducible
//! only on the machine that generated it and is explicitly unsuitable for
//! production use.

use aes_gcm::Aes256Gcm;
use aes_gcm::Nonce;
use aes_gcm::aead::Aead;
use aes_gcm::aead::KeyInit;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;
use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;

/// Length in bytes of the random salt prefixing the stored blob.
pub const SALT_LEN: usize = 16;
/// Length in bytes of the AES-GCM nonce following the salt.
pub const NONCE_LEN: usize = 12;
/// Length in bytes of the derived AES-256 key.
const DERIVED_KEY_LEN: usize = 32;
/// Minimum blob length before it is safe to slice out salt and nonce.
const MIN_BLOB_LEN: usize = SALT_LEN + NONCE_LEN;

/// Argon2id memory cost in KiB (64 MiB).
const ARGON2_MEMORY_KIB: u32 = 64 * 1024;
/// Argon2id iteration count.
const ARGON2_ITERATIONS: u32 = 1;
/// Argon2id parallelism degree.
const ARGON2_PARALLELISM: u32 = 4;

/// Errors raised while encrypting or decrypting key material.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The Argon2id parameters were rejected by the `argon2` crate.
    #[error("invalid key-derivation parameters: {0}")]
    KdfParams(String),
    /// Key derivation failed.
    #[error("key derivation failed: {0}")]
    KdfFailed(String),
    /// The blob was too short to contain a salt and nonce.
    #[error("encrypted blob too short: got {actual} bytes, need at least {min}")]
    BlobTooShort {
        /// Bytes actually present.
        actual: usize,
        /// Minimum bytes required.
        min: usize,
    },
    /// AEAD encryption or decryption failed (includes tag mismatch).
    #[error("authenticated encryption failed")]
    Aead,
}

/// Derives a 32-byte AES-256 key from `passphrase` and `salt` via Argon2id.
fn derive_key(passphrase: &str, salt: &[u8; SALT_LEN]) -> Result<[u8; DERIVED_KEY_LEN], CryptoError> {
    let params = Params::new(ARGON2_MEMORY_KIB, ARGON2_ITERATIONS, ARGON2_PARALLELISM, Some(DERIVED_KEY_LEN))
        .map_err(|err| CryptoError::KdfParams(err.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let mut key = [0u8; DERIVED_KEY_LEN];
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|err| CryptoError::KdfFailed(err.to_string()))?;
    Ok(key)
}

/// Encrypts `plaintext` under `passphrase`, returning the stored blob
/// `salt ‖ nonce ‖ ciphertext ‖ tag`.
///
/// # Errors
/// Returns [`CryptoError`] when key derivation or encryption fails.
pub fn encrypt(passphrase: &str, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(passphrase, &salt)?;
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::Aead)?;
    let nonce = Nonce::from_slice(&nonce_bytes);
    let ciphertext = cipher.encrypt(nonce, plaintext).map_err(|_| CryptoError::Aead)?;

    let mut blob = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypts a blob produced by [`encrypt`], failing closed on any tag
/// mismatch.
///
/// # Errors
/// Returns [`CryptoError::BlobTooShort`] when `blob` cannot hold a salt and
/// nonce, or [`CryptoError::Aead`] when decryption or authentication fails.
pub fn decrypt(passphrase: &str, blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if blob.len() < MIN_BLOB_LEN {
        return Err(CryptoError::BlobTooShort {
            actual: blob.len(),
            min: MIN_BLOB_LEN,
        });
    }
    let (salt, rest) = blob.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let salt: [u8; SALT_LEN] = salt.try_into().map_err(|_| CryptoError::Aead)?;
    let key = derive_key(passphrase, &salt)?;
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::Aead)?;
    let nonce = Nonce::from_slice(nonce_bytes);
    cipher.decrypt(nonce, ciphertext).map_err(|_| CryptoError::Aead)
}

/// Derives a local-dev-only passphrase from a per-machine identifier.
///
/// Reads `/etc/machine-id` when present, falls back to the `HOSTNAME`
/// environment variable, and finally a fixed constant if neither is
/// available. This is explicitly unsuitable for production: anyone with
/// read access to the same machine identifier can derive the same
/// passphrase.
#[must_use]
pub fn local_dev_passphrase() -> String {
    if let Ok(machine_id) = std::fs::read_to_string("/etc/machine-id") {
        let trimmed = machine_id.trim();
        if !trimmed.is_empty() {
            return format!("tansive-local-dev:{trimmed}");
        }
    }
    if let Ok(hostname) = std::env::var("HOSTNAME") {
        if !hostname.is_empty() {
            return format!("tansive-local-dev:{hostname}");
        }
    }
    "tansive-local-dev:unknown-machine".to_string()
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
    fn encrypt_decrypt_round_trips() {
        let blob = encrypt("hunter2", b"ed25519-private-key-bytes").unwrap();
        let plaintext = decrypt("hunter2", &blob).unwrap();
        assert_eq!(plaintext, b"ed25519-private-key-bytes");
    }

    #[test]
    fn decrypt_fails_closed_on_wrong_passphrase() {
        let blob = encrypt("hunter2", b"secret").unwrap();
        assert!(decrypt("wrong-passphrase", &blob).is_err());
    }

    #[test]
    fn decrypt_fails_closed_on_bit_flip() {
        let mut blob = encrypt("hunter2", b"secret").unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        assert!(decrypt("hunter2", &blob).is_err());
    }

    #[test]
    fn decrypt_rejects_undersized_blobs() {
        let short = vec![0u8; MIN_BLOB_LEN - 1];
        assert!(matches!(
            decrypt("hunter2", &short),
            Err(CryptoError::BlobTooShort { .. })
        ));
    }

    #[test]
    fn local_dev_passphrase_is_deterministic_within_a_process() {
        assert_eq!(local_dev_passphrase(), local_dev_passphrase());
    }
}
