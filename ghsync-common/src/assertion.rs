//! Time-bounded App assertions.
//!
//! An assertion is a ten-minute RS256 JWT carrying `{iat, exp, iss}` - long
//! enough to cover the two sequential API round trips, short enough to limit
//! replay value. Each call to [`AssertionSigner::sign`] mints a fresh,
//! independently timestamped assertion; nothing is cached between the
//! installation-discovery call and the token exchange.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::util::unix_now;
use crate::vault::SigningKeyHandle;

/// Assertion validity window in seconds.
pub const ASSERTION_TTL_SECS: u64 = 600;

/// Clock-skew allowance backdating `iat`.
const IAT_SKEW_SECS: u64 = 60;

/// Signing failures.
#[derive(Debug, Error)]
pub enum AssertionError {
    /// The decrypted key is not a usable RSA PEM.
    #[error("private key is not a valid RSA PEM: {0}")]
    InvalidKey(String),

    /// JWT encoding failed.
    #[error("failed to sign assertion: {0}")]
    SignFailed(String),
}

/// JWT claims for App authentication.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Issued-at (Unix timestamp), backdated for clock skew.
    pub iat: u64,
    /// Expiration (Unix timestamp), ten minutes out.
    pub exp: u64,
    /// Issuer: the App's client ID (or numeric App ID).
    pub iss: String,
}

/// A signed, time-bounded identity claim. Used once, then discarded.
pub struct Assertion {
    jwt: String,
    /// `exp` claim, for diagnostics only; the remote clock is authoritative.
    pub expires_at: u64,
}

impl Assertion {
    /// The encoded JWT, suitable for a `Bearer` authorization header.
    pub fn bearer(&self) -> &str {
        &self.jwt
    }
}

impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertion")
            .field("jwt", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Builds and signs assertions for a fixed issuer.
pub struct AssertionSigner {
    issuer: String,
}

impl AssertionSigner {
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
        }
    }

    /// Signs a fresh assertion valid from now.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError`] when the key is not a valid RSA PEM or
    /// encoding fails.
    pub fn sign(&self, key: &SigningKeyHandle) -> Result<Assertion, AssertionError> {
        self.sign_at(key, unix_now())
    }

    /// Signs an assertion anchored at an explicit timestamp. Exists for
    /// deterministic tests; production callers use [`Self::sign`].
    pub fn sign_at(&self, key: &SigningKeyHandle, now: u64) -> Result<Assertion, AssertionError> {
        let claims = Claims {
            iat: now.saturating_sub(IAT_SKEW_SECS),
            exp: now + ASSERTION_TTL_SECS,
            iss: self.issuer.clone(),
        };

        let encoding_key = EncodingKey::from_rsa_pem(key.pem_bytes())
            .map_err(|e| AssertionError::InvalidKey(e.to_string()))?;

        let jwt = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| AssertionError::SignFailed(e.to_string()))?;

        Ok(Assertion {
            jwt,
            expires_at: claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::KeyVault;
    use jsonwebtoken::{DecodingKey, Validation, decode};
    use rsa::pkcs1::EncodeRsaPrivateKey;
    use rsa::pkcs8::{EncodePublicKey, LineEnding};
    use rsa::{RsaPrivateKey, RsaPublicKey};

    /// Generates a real keypair and returns (private PEM, public PEM).
    fn test_keypair() -> (String, String) {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 2048).expect("keygen");
        let public = RsaPublicKey::from(&private);
        let private_pem = private.to_pkcs1_pem(LineEnding::LF).expect("pkcs1 pem");
        let public_pem = public.to_public_key_pem(LineEnding::LF).expect("spki pem");
        (private_pem.to_string(), public_pem)
    }

    fn handle_for(pem: &str) -> crate::vault::SigningKeyHandle {
        let blob = KeyVault::seal(pem.as_bytes(), "test-hash").unwrap();
        KeyVault::decrypt(&blob, "test-hash").unwrap()
    }

    #[test]
    fn signed_assertion_verifies_against_public_key() {
        let (private_pem, public_pem) = test_keypair();
        let handle = handle_for(&private_pem);

        let signer = AssertionSigner::new("Iv1.abc123");
        let now = unix_now();
        let assertion = signer.sign_at(&handle, now).unwrap();

        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes()).unwrap();
        let validation = Validation::new(Algorithm::RS256);
        let decoded = decode::<Claims>(assertion.bearer(), &decoding_key, &validation).unwrap();

        assert_eq!(decoded.claims.iss, "Iv1.abc123");
        assert_eq!(decoded.claims.iat, now - 60);
        assert_eq!(decoded.claims.exp, now + ASSERTION_TTL_SECS);
        assert_eq!(assertion.expires_at, now + ASSERTION_TTL_SECS);
    }

    #[test]
    fn verification_rejects_other_keys() {
        let (private_pem, _) = test_keypair();
        let (_, other_public_pem) = test_keypair();
        let handle = handle_for(&private_pem);

        let assertion = AssertionSigner::new("123456")
            .sign_at(&handle, unix_now())
            .unwrap();

        let wrong_key = DecodingKey::from_rsa_pem(other_public_pem.as_bytes()).unwrap();
        let validation = Validation::new(Algorithm::RS256);
        assert!(decode::<Claims>(assertion.bearer(), &wrong_key, &validation).is_err());
    }

    #[test]
    fn expired_assertion_fails_validation() {
        let (private_pem, public_pem) = test_keypair();
        let handle = handle_for(&private_pem);

        // Anchored far enough back that exp is past any leeway.
        let stale = unix_now() - 7200;
        let assertion = AssertionSigner::new("123456")
            .sign_at(&handle, stale)
            .unwrap();

        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes()).unwrap();
        let validation = Validation::new(Algorithm::RS256);
        assert!(decode::<Claims>(assertion.bearer(), &decoding_key, &validation).is_err());
    }

    #[test]
    fn each_signature_is_fresh() {
        let (private_pem, _) = test_keypair();
        let handle = handle_for(&private_pem);
        let signer = AssertionSigner::new("123456");

        let a = signer.sign_at(&handle, 1_700_000_000).unwrap();
        let b = signer.sign_at(&handle, 1_700_000_005).unwrap();
        assert_ne!(a.bearer(), b.bearer());
    }

    #[test]
    fn debug_output_redacts_the_jwt() {
        let (private_pem, _) = test_keypair();
        let handle = handle_for(&private_pem);
        let assertion = AssertionSigner::new("123456")
            .sign_at(&handle, unix_now())
            .unwrap();

        let rendered = format!("{assertion:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(assertion.bearer()));
    }

    #[test]
    fn garbage_key_is_rejected() {
        let handle = handle_for("not a pem at all");
        let err = AssertionSigner::new("123456")
            .sign_at(&handle, unix_now())
            .unwrap_err();
        assert!(matches!(err, AssertionError::InvalidKey(_)));
    }
}
