// crates/tansive-token/src/service.rs
// ============================================================================
// Module: Tansive Token Service
// Description: Mint and validate signed bearer tokens.
// Purpose: Implement component 4.B — createToken / parseAndValidateToken.
// Dependencies: jsonwebtoken, ed25519-dalek, tansive-core, tansive-crypto, tansive-policy
// ============================================================================

//! ## Overview
//! [`TokenService`] mints EdDSA-signed JWTs asserting a view and validates
//! them on the way back in. Minting resolves the tenant's active signing
//! key via [`tansive_crypto::SigningKeyStore`]; validation additionally
//! consults a [`RevocationChecker`] and reloads the asserted view from the
//! configured [`ViewRepository`] so a deleted or edited view cannot be
//! impersonated by an old token.

use ed25519_dalek::SigningKey as Ed25519SigningKey;
use ed25519_dalek::VerifyingKey;
use ed25519_dalek::pkcs8::EncodePrivateKey;
use ed25519_dalek::pkcs8::EncodePublicKey;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde_json::Map;
use serde_json::Value;
use tansive_core::core::ApiError;
use tansive_core::core::TenantId;
use tansive_core::core::View;
use tansive_core::core::ViewDefinition;
use tansive_core::core::ViewId;
use tansive_core::interfaces::RevocationChecker;
use tansive_core::interfaces::ViewRepository;
use tansive_crypto::SigningKeyStore;
use tansive_policy::validate_derived_view;
use time::Duration;
use time::OffsetDateTime;

use crate::claims::TokenClaims;

/// Configuration governing minted and validated tokens.
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// The `iss` claim value.
    pub issuer: String,
    /// The `aud` claim value.
    pub audience: String,
    /// Default lifetime of a minted token.
    pub default_token_validity: Duration,
    /// Maximum age of a token's `iat` before it is rejected outright.
    pub max_token_age: Duration,
    /// Symmetric clock-skew slack applied to `exp`/`nbf`/`iat` checks.
    pub clock_skew: Duration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            issuer: "tansive".to_string(),
            audience: "tansive-api".to_string(),
            default_token_validity: Duration::hours(1),
            max_token_age: Duration::hours(24),
            clock_skew: Duration::minutes(5),
        }
    }
}

/// A validated token handle.
///
/// # Invariants
/// - `view` was freshly loaded from the repository at validation time; it
///   is never the stale copy embedded in an older token.
#[derive(Debug, Clone)]
pub struct Token {
    /// The decoded claim set.
    claims: TokenClaims,
    /// The view loaded from storage, matching `claims.view_id`.
    view: View,
    /// The original compact JWS string.
    raw: String,
}

impl Token {
    /// Returns the asserted view's identifier.
    #[must_use]
    pub fn view_id(&self) -> ViewId {
        self.view.view_id
    }

    /// Returns the freshly loaded view definition.
    #[must_use]
    pub fn view(&self) -> &ViewDefinition {
        &self.view.rules
    }

    /// Returns the tenant this token was minted for.
    #[must_use]
    pub fn tenant_id(&self) -> &TenantId {
        &self.claims.tenant_id
    }

    /// Returns the `sub` claim, if present.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.claims.subject()
    }

    /// Returns the `token_use` claim, if present.
    #[must_use]
    pub fn token_use(&self) -> Option<&str> {
        self.claims.token_use()
    }

    /// Returns the token's expiry as a timestamp.
    #[must_use]
    pub fn expiry(&self) -> Result<OffsetDateTime, time::error::ComponentRange> {
        OffsetDateTime::from_unix_timestamp(self.claims.exp)
    }

    /// Returns an arbitrary UUID-typed claim from the additional-claims bag.
    #[must_use]
    pub fn uuid_claim(&self, name: &str) -> Option<uuid::Uuid> {
        self.claims.get_uuid_claim(name)
    }

    /// Returns the original compact JWS string this handle was parsed from.
    #[must_use]
    pub fn raw_token(&self) -> &str {
        &self.raw
    }
}

/// Mints and validates bearer tokens for a tenant's signing key.
pub struct TokenService<R, V, C> {
    /// The active-signing-key cache and generator.
    signing_keys: SigningKeyStore<R>,
    /// The view repository consulted on every validation.
    views: V,
    /// The revocation checker consulted on every validation.
    revocation: C,
    /// Issuer/audience/timing configuration.
    config: TokenServiceConfig,
}

impl<R, V, C> TokenService<R, V, C>
where
    R: tansive_core::interfaces::SigningKeyRepository,
    V: ViewRepository,
    C: RevocationChecker,
{
    /// Builds a new token service.
    pub fn new(signing_keys: SigningKeyStore<R>, views: V, revocation: C, config: TokenServiceConfig) -> Self {
        Self {
            signing_keys,
            views,
            revocation,
            config,
        }
    }

    /// Mints a token asserting `view`. If `parent_view` is supplied, `view`'s
    /// rules must be a policy-subset of `parent_view`'s, or minting fails
    /// with a disallowed-by-policy error.
    ///
    /// # Errors
    /// Returns [`ApiError`] (kind `DisallowedByPolicy`) when `parent_view`
    /// is supplied and `view` does not derive from it, or (kind `Internal`)
    /// when key resolution, encoding, or signing fails.
    pub fn create_token(
        &self,
        view: &View,
        additional_claims: Map<String, Value>,
        parent_view: Option<&ViewDefinition>,
    ) -> Result<(String, OffsetDateTime), ApiError> {
        if let Some(parent) = parent_view {
            if !validate_derived_view(parent, &view.rules) {
                return Err(ApiError::disallowed_by_policy(
                    "view is not a policy subset of the parent view",
                ));
            }
        }

        let signing_key = self.signing_keys.get_active_key(&view.tenant_id)?;
        let ed25519_key = self.signing_keys.decrypt_private_key(&signing_key)?;

        let now = OffsetDateTime::now_utc();
        let expires_at = now + self.config.default_token_validity;
        let claims = TokenClaims {
            view_id: view.view_id,
            tenant_id: view.tenant_id.clone(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.unix_timestamp(),
            nbf: now.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
            extra: additional_claims,
        };

        let encoding_key = encoding_key_from_signing_key(&ed25519_key)?;
        let token = jsonwebtoken::encode(&Header::new(Algorithm::EdDSA), &claims, &encoding_key)
            .map_err(|err| ApiError::internal("token signing failed").with_cause(err))?;
        Ok((token, expires_at))
    }

    /// Parses and validates a bearer token, returning a [`Token`] handle.
    ///
    /// # Errors
    /// Returns [`ApiError`] (kind `Unauthorized`) on a malformed token,
    /// signature failure, missing/invalid claims, a temporal check failure,
    /// or a revoked token; (kind `NotFound`) when the asserted view no
    /// longer exists; (kind `Internal`) when key resolution fails.
    pub fn parse_and_validate_token(&self, token_string: &str, tenant_id: &TenantId) -> Result<Token, ApiError> {
        let signing_key = self.signing_keys.get_active_key(tenant_id)?;
        let public_key_bytes: [u8; 32] = signing_key
            .public_key
            .as_slice()
            .try_into()
            .map_err(|_| ApiError::internal("stored signing key has unexpected public key length"))?;
        let public_key = VerifyingKey::from_bytes(&public_key_bytes)
            .map_err(|err| ApiError::internal("stored signing key is not a valid Ed25519 public key").with_cause(err))?;
        let decoding_key = decoding_key_from_public_key(&public_key)?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_nbf = true;
        validation.leeway = clock_skew_seconds(self.config.clock_skew);

        let decoded = jsonwebtoken::decode::<TokenClaims>(token_string, &decoding_key, &validation)
            .map_err(|err| ApiError::unauthorized("token signature or claims invalid").with_cause(err))?;
        let claims = decoded.claims;

        let now = OffsetDateTime::now_utc();
        let max_age_floor = now - self.config.max_token_age;
        let iat = OffsetDateTime::from_unix_timestamp(claims.iat)
            .map_err(|err| ApiError::unauthorized("token iat out of range").with_cause(err))?;
        if iat < max_age_floor {
            return Err(ApiError::unauthorized("token exceeds maximum age"));
        }

        if self
            .revocation
            .is_revoked(&claims.jti)
            .map_err(|err| ApiError::internal("revocation check failed").with_cause(err))?
        {
            return Err(ApiError::unauthorized("token has been revoked"));
        }

        let view = self
            .views
            .get_by_id(&claims.tenant_id, &claims.view_id)
            .map_err(|err| ApiError::internal("failed to load asserted view").with_cause(err))?
            .ok_or_else(|| ApiError::not_found("asserted view no longer exists"))?;

        Ok(Token {
            claims,
            view,
            raw: token_string.to_string(),
        })
    }
}

/// Builds a jsonwebtoken `EncodingKey` from an Ed25519 key pair via its
/// PKCS8 DER encoding.
fn encoding_key_from_signing_key(key: &Ed25519SigningKey) -> Result<EncodingKey, ApiError> {
    let der = key
        .to_pkcs8_der()
        .map_err(|err| ApiError::internal("failed to DER-encode signing key").with_cause(std::io::Error::other(err.to_string())))?;
    Ok(EncodingKey::from_ed_der(der.as_bytes()))
}

/// Builds a jsonwebtoken `DecodingKey` from an Ed25519 public key via its
/// SPKI DER encoding.
fn decoding_key_from_public_key(key: &VerifyingKey) -> Result<DecodingKey, ApiError> {
    let der = key
        .to_public_key_der()
        .map_err(|err| ApiError::internal("failed to DER-encode public key").with_cause(std::io::Error::other(err.to_string())))?;
    Ok(DecodingKey::from_ed_der(der.as_bytes()))
}

/// Converts a `time::Duration` clock-skew value into whole seconds for
/// `jsonwebtoken::Validation::leeway`.
fn clock_skew_seconds(skew: Duration) -> u64 {
    skew.whole_seconds().try_into().unwrap_or(0)
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

    use tansive_core::core::Action;
    use tansive_core::core::Intent;
    use tansive_core::core::Scope;
    use tansive_core::interfaces::RepositoryError;
    use tansive_core::interfaces::SigningKeyRepository;

    use super::*;

    #[derive(Default)]
    struct InMemoryKeys {
        active: Mutex<Option<tansive_core::core::SigningKey>>,
    }

    impl SigningKeyRepository for InMemoryKeys {
        fn load_active(&self, _tenant_id: &TenantId) -> Result<Option<tansive_core::core::SigningKey>, RepositoryError> {
            Ok(self.active.lock().expect("lock").clone())
        }

        fn insert_active(&self, key: &tansive_core::core::SigningKey) -> Result<(), RepositoryError> {
            *self.active.lock().expect("lock") = Some(key.clone());
            Ok(())
        }
    }

    struct InMemoryViews {
        view: View,
    }

    impl ViewRepository for InMemoryViews {
        fn get_by_label(
            &self,
            _tenant_id: &TenantId,
            _catalog_id: &tansive_core::core::CatalogId,
            label: &str,
        ) -> Result<Option<View>, RepositoryError> {
            Ok((self.view.label == label).then(|| self.view.clone()))
        }

        fn get_by_id(&self, _tenant_id: &TenantId, view_id: &ViewId) -> Result<Option<View>, RepositoryError> {
            Ok((self.view.view_id == *view_id).then(|| self.view.clone()))
        }

        fn insert(&self, _view: &View) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    struct NeverRevoked;

    impl RevocationChecker for NeverRevoked {
        fn is_revoked(&self, _jti: &str) -> Result<bool, RepositoryError> {
            Ok(false)
        }
    }

    fn sample_view() -> View {
        View {
            view_id: ViewId::new(),
            label: "admin".to_string(),
            catalog_id: tansive_core::core::CatalogId::new(),
            rules: ViewDefinition::new(Scope::catalog("c")),
            tenant_id: TenantId::new("T1").unwrap(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn sample_service(view: View) -> TokenService<InMemoryKeys, InMemoryViews, NeverRevoked> {
        TokenService::new(
            SigningKeyStore::new(InMemoryKeys::default(), "test-passphrase".to_string()),
            InMemoryViews { view },
            NeverRevoked,
            TokenServiceConfig::default(),
        )
    }

    #[test]
    fn mint_and_validate_round_trip_preserves_the_view() {
        let view = sample_view();
        let service = sample_service(view.clone());

        let mut extra = Map::new();
        extra.insert("sub".to_string(), Value::String("user/alice".to_string()));
        let (token, _expires_at) = service.create_token(&view, extra, None).unwrap();

        let validated = service.parse_and_validate_token(&token, &view.tenant_id).unwrap();
        assert_eq!(validated.view_id(), view.view_id);
        assert_eq!(validated.subject(), Some("user/alice"));
    }

    #[test]
    fn tamper_detection_rejects_a_flipped_signature_byte() {
        let view = sample_view();
        let service = sample_service(view.clone());
        let (mut token, _) = service.create_token(&view, Map::new(), None).unwrap();
        let last = token.len() - 1;
        let byte = token.as_bytes()[last];
        let flipped = if byte == b'A' { b'B' } else { b'A' };
        token.truncate(last);
        token.push(flipped as char);

        assert!(service.parse_and_validate_token(&token, &view.tenant_id).is_err());
    }

    #[test]
    fn mint_rejects_a_view_that_is_not_a_subset_of_the_parent() {
        let mut child = sample_view();
        child.rules.rules.push(tansive_core::core::Rule {
            intent: Intent::Allow,
            actions: vec![Action::ResourceDelete],
            targets: vec!["resource/file".to_string()],
        });
        let service = sample_service(child.clone());
        let parent = ViewDefinition::new(Scope::catalog("c"));

        let result = service.create_token(&child, Map::new(), Some(&parent));
        assert!(matches!(result, Err(err) if err.kind() == tansive_core::core::ErrorKind::DisallowedByPolicy));
    }
}
