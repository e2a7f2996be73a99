// ABOUTME: Process-wide RSA signing keypair for RS256 token signing and verification
// ABOUTME: Loaded once at startup from the passphrase-protected keystore, immutable after
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Key material for stateless token signing.
//!
//! [`KeyMaterial`] is constructed exactly once during process startup and
//! shared by reference into the issuer and validator. It is immutable, so
//! concurrent sign/verify access needs no synchronization. Failure to load it
//! is fatal: the process must not accept requests without a signing key.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use rsa::{
    pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey},
    RsaPrivateKey, RsaPublicKey,
};
use serde::{Deserialize, Serialize};

use super::keystore::KeyStore;
use crate::config::AuthConfig;
use crate::errors::{AuthError, AuthResult};

/// RSA key size for generated keys; 2048 keeps tests fast, production stores
/// are provisioned externally and may carry larger keys.
const GENERATED_KEY_SIZE: usize = 2048;

/// JWK (JSON Web Key) representation of the public verification key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWebKey {
    /// Key type (always "RSA")
    pub kty: String,
    /// Public key use (always "sig")
    #[serde(rename = "use")]
    pub key_use: String,
    /// Key ID
    pub kid: String,
    /// Algorithm (RS256)
    pub alg: String,
    /// RSA modulus (base64url)
    pub n: String,
    /// RSA exponent (base64url)
    pub e: String,
}

/// Immutable process-wide signing keypair
pub struct KeyMaterial {
    kid: String,
    public_key: RsaPublicKey,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    public_pem: String,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("kid", &self.kid)
            .finish_non_exhaustive()
    }
}

impl KeyMaterial {
    /// Load the keypair named by `config` from its passphrase-protected store.
    ///
    /// # Errors
    /// Returns [`AuthError::KeyMaterialUnavailable`] if the store is missing,
    /// the passphrase is wrong, the alias is absent, or the key is not a
    /// valid PKCS#8 RSA key. Callers must treat this as fatal at startup.
    pub fn load(config: &AuthConfig) -> AuthResult<Self> {
        let path = config
            .keystore_path
            .as_deref()
            .ok_or_else(|| Self::unavailable("keystore path not configured"))?;
        let passphrase = config
            .keystore_passphrase
            .as_deref()
            .ok_or_else(|| Self::unavailable("keystore passphrase not configured"))?;

        Self::load_from_store(path, passphrase, &config.key_alias)
    }

    /// Load a keypair from an explicit store path, passphrase, and alias
    ///
    /// # Errors
    /// Same failure modes as [`KeyMaterial::load`]
    pub fn load_from_store(path: &Path, passphrase: &str, alias: &str) -> AuthResult<Self> {
        let store = KeyStore::open(path, passphrase)
            .map_err(|e| Self::unavailable(&format!("{e:#}")))?;

        let pem = store
            .private_key_pem(alias)
            .map_err(|e| Self::unavailable(&format!("{e:#}")))?;

        let material = Self::from_private_key_pem(alias, &pem)
            .map_err(|e| Self::unavailable(&format!("{e:#}")))?;

        tracing::info!(alias = %alias, path = %path.display(), "signing keypair loaded");
        Ok(material)
    }

    /// Generate an ephemeral keypair. Intended for tests and development; a
    /// production deployment loads a provisioned keypair from the store.
    ///
    /// # Errors
    /// Returns an error if RSA key generation or PEM encoding fails
    pub fn generate(kid: &str) -> AuthResult<Self> {
        use rand::rngs::OsRng;

        let mut rng = OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, GENERATED_KEY_SIZE)
            .map_err(|e| AuthError::Internal(anyhow!("RSA key generation failed: {e}")))?;

        let pem = private_key
            .to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)
            .map_err(|e| AuthError::Internal(anyhow!("PKCS#8 export failed: {e}")))?;

        Self::from_private_key_pem(kid, &pem).map_err(AuthError::Internal)
    }

    /// Export the private key of a generated keypair as PKCS#8 PEM.
    /// Used by provisioning helpers to seed a keystore.
    ///
    /// # Errors
    /// Returns an error if RSA key generation or PEM encoding fails
    pub fn generate_private_key_pem() -> Result<String> {
        use rand::rngs::OsRng;

        let mut rng = OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, GENERATED_KEY_SIZE)
            .map_err(|e| anyhow!("RSA key generation failed: {e}"))?;

        private_key
            .to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)
            .map(|pem| pem.to_string())
            .map_err(|e| anyhow!("PKCS#8 export failed: {e}"))
    }

    fn from_private_key_pem(kid: &str, pem: &str) -> Result<Self> {
        let private_key =
            RsaPrivateKey::from_pkcs8_pem(pem).context("key is not a valid PKCS#8 RSA key")?;
        let public_key = RsaPublicKey::from(&private_key);

        let public_pem = public_key
            .to_public_key_pem(rsa::pkcs8::LineEnding::LF)
            .context("failed to export public key as PEM")?;

        let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .context("failed to build RS256 encoding key")?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes())
            .context("failed to build RS256 decoding key")?;

        Ok(Self {
            kid: kid.to_owned(),
            public_key,
            encoding_key,
            decoding_key,
            public_pem,
        })
    }

    fn unavailable(reason: &str) -> AuthError {
        tracing::error!(reason = %reason, "key material unavailable");
        AuthError::KeyMaterialUnavailable {
            reason: reason.to_owned(),
        }
    }

    /// Sign a claim set as a compact RS256 JWT with this key's kid header
    ///
    /// # Errors
    /// Returns an error if JWT encoding fails
    pub fn encode_claims<T: Serialize>(&self, claims: &T) -> AuthResult<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.kid.clone());

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(anyhow!("RS256 signing failed: {e}")))
    }

    /// Verification key for token decoding
    #[must_use]
    pub const fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    /// Key identifier carried in signed token headers
    #[must_use]
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Public verification key as SPKI PEM
    #[must_use]
    pub fn public_key_pem(&self) -> &str {
        &self.public_pem
    }

    /// Public verification key in JWK form (base64url modulus and exponent)
    #[must_use]
    pub fn jwk(&self) -> JsonWebKey {
        use rsa::traits::PublicKeyParts;

        let n_bytes = self.public_key.n().to_bytes_be();
        let e_bytes = self.public_key.e().to_bytes_be();

        JsonWebKey {
            kty: "RSA".to_owned(),
            key_use: "sig".to_owned(),
            kid: self.kid.clone(),
            alg: "RS256".to_owned(),
            n: URL_SAFE_NO_PAD.encode(n_bytes),
            e: URL_SAFE_NO_PAD.encode(e_bytes),
        }
    }
}
