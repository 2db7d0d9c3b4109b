// crates/tansive-crypto/src/signing_key_store.rs
// ============================================================================
// Module: Tansive Signing Key Store
// Description: The process-wide, read-through cache for a tenant's active signing key.
// Purpose: Idempotently resolve, generate, and cache Ed25519 signing keys.
// Dependencies: tansive-core, ed25519-dalek, rand, time
// ============================================================================

//! ## Overview
//! [`SigningKeyStore`] is the single process-wide instance every request
//! consults for the active signing key. The read path is lock-free once
//! warm; the cold path (no cached key, possibly no persisted key either)
//! serializes database load and key generation behind a write lock so two
//! concurrent callers never generate two "active" keys for the same tenant.
//!
//! # Invariants
//! - A key whose database insert failed is never cached: on
//!   [`SigningKeyStore::get_active_key`] failure, no partial state is left
//!   active.

use std::collections::HashMap;
use std::sync::RwLock;

use ed25519_dalek::SigningKey as Ed25519SigningKey;
use rand::rngs::OsRng;
use tansive_core::core::ApiError;
use tansive_core::core::SigningKey;
use tansive_core::core::SigningKeyId;
use tansive_core::core::TenantId;
use tansive_core::interfaces::SigningKeyRepository;
use time::OffsetDateTime;

use crate::key_encryption;

/// Process-wide cache and generator of tenants' active signing keys.
pub struct SigningKeyStore<R> {
    /// Backing repository for loading and persisting signing keys.
    repository: R,
    /// Passphrase the private-key envelope is derived from.
    passphrase: String,
    /// Read-through cache, keyed by tenant.
    cache: RwLock<HashMap<TenantId, SigningKey>>,
}

impl<R: SigningKeyRepository> SigningKeyStore<R> {
    /// Builds a new store backed by `repository`, encrypting new keys under
    /// `passphrase`.
    pub fn new(repository: R, passphrase: String) -> Self {
        Self {
            repository,
            passphrase,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the tenant's active signing key, loading or generating one if
    /// necessary.
    ///
    /// # Errors
    /// Returns [`ApiError`] (kind `Internal`) when the database load,
    /// key generation, encryption, or persist step fails.
    pub fn get_active_key(&self, tenant_id: &TenantId) -> Result<SigningKey, ApiError> {
        if let Some(key) = self.read_cached(tenant_id) {
            return Ok(key);
        }

        let mut cache = self
            .cache
            .write()
            .map_err(|_| ApiError::internal("signing key cache lock poisoned"))?;
        if let Some(key) = cache.get(tenant_id) {
            return Ok(key.clone());
        }

        let loaded = self
            .repository
            .load_active(tenant_id)
            .map_err(|err| ApiError::internal("failed to load active signing key").with_cause(err))?;
        let key = match loaded {
            Some(key) => key,
            None => self.generate_and_persist(tenant_id)?,
        };
        cache.insert(tenant_id.clone(), key.clone());
        Ok(key)
    }

    /// Decrypts the private half of `key` for signing use.
    ///
    /// # Errors
    /// Returns [`ApiError`] (kind `Internal`) when decryption fails or the
    /// decrypted material is not a 32-byte Ed25519 secret.
    pub fn decrypt_private_key(&self, key: &SigningKey) -> Result<Ed25519SigningKey, ApiError> {
        let bytes = key_encryption::decrypt(&self.passphrase, &key.encrypted_private_key)
            .map_err(|err| ApiError::internal("signing key decryption failed").with_cause(err))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ApiError::internal("decrypted signing key has unexpected length"))?;
        Ok(Ed25519SigningKey::from_bytes(&array))
    }

    /// Returns the cached key for `tenant_id`, if warm.
    fn read_cached(&self, tenant_id: &TenantId) -> Option<SigningKey> {
        self.cache.read().ok()?.get(tenant_id).cloned()
    }

    /// Generates a fresh Ed25519 key pair, encrypts the private half, and
    /// persists the result as the tenant's active key.
    fn generate_and_persist(&self, tenant_id: &TenantId) -> Result<SigningKey, ApiError> {
        let signing_key = Ed25519SigningKey::generate(&mut OsRng);
        let public_key = signing_key.verifying_key().to_bytes().to_vec();
        let encrypted_private_key =
            key_encryption::encrypt(&self.passphrase, signing_key.to_bytes().as_slice())
                .map_err(|err| ApiError::internal("signing key encryption failed").with_cause(err))?;

        let key = SigningKey {
            key_id: SigningKeyId::new(),
            tenant_id: tenant_id.clone(),
            public_key,
            encrypted_private_key,
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
            expires_at: None,
        };
        self.repository.insert_active(&key).map_err(|err| {
            ApiError::internal("failed to persist newly generated signing key").with_cause(err)
        })?;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::missing_docs_in_private_items,
        reason = "Test-only panic-based assertions are permitted."
    )]

    use std::sync::Mutex;

    use tansive_core::interfaces::RepositoryError;

    use super::*;

    #[derive(Default)]
    struct InMemoryRepo {
        active: Mutex<Option<SigningKey>>,
    }

    impl SigningKeyRepository for InMemoryRepo {
        fn load_active(&self, _tenant_id: &TenantId) -> Result<Option<SigningKey>, RepositoryError> {
            Ok(self.active.lock().expect("lock").clone())
        }

        fn insert_active(&self, key: &SigningKey) -> Result<(), RepositoryError> {
            *self.active.lock().expect("lock") = Some(key.clone());
            Ok(())
        }
    }

    #[test]
    fn get_active_key_generates_once_and_caches() {
        let store = SigningKeyStore::new(InMemoryRepo::default(), "test-passphrase".to_string());
        let tenant_id = TenantId::new("T1").unwrap();
        let first = store.get_active_key(&tenant_id).unwrap();
        let second = store.get_active_key(&tenant_id).unwrap();
        assert_eq!(first.key_id, second.key_id);
    }

    #[test]
    fn decrypt_private_key_round_trips_the_generated_key() {
        let store = SigningKeyStore::new(InMemoryRepo::default(), "test-passphrase".to_string());
        let tenant_id = TenantId::new("T1").unwrap();
        let key = store.get_active_key(&tenant_id).unwrap();
        let signing_key = store.decrypt_private_key(&key).unwrap();
        assert_eq!(signing_key.verifying_key().to_bytes().to_vec(), key.public_key);
    }
}
