// crates/tansive-crypto/src/lib.rs
// ============================================================================
// Module: Tansive Crypto Library
// Description: Key encryption at rest and the active-signing-key store.
// Purpose: Provide the cryptographic primitives components 4.A relies on.
// Dependencies: aes-gcm, argon2, ed25519-dalek, tansive-core
// ============================================================================

//! ## Overview
//! Tansive Crypto owns two concerns: encrypting signing-key material at rest
//! ([`key_encryption`]) and the process-wide active-key cache/generator
//! ([`signing_key_store`]). Neither module knows about HTTP or persistence
//! backends beyond the [`tansive_core::interfaces::SigningKeyRepository`]
//! seam.

pub mod key_encryption;
pub mod signing_key_store;

pub use key_encryption::CryptoError;
pub use signing_key_store::SigningKeyStore;
