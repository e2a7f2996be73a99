// ABOUTME: Environment-driven configuration for keystore location and token validities
// ABOUTME: Missing keystore settings become a fatal error when key material is loaded
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use std::env;
use std::path::PathBuf;

/// Default access token validity: 12 hours
pub const DEFAULT_ACCESS_TOKEN_VALIDITY_SECS: i64 = 43_200;

/// Default refresh token validity: 30 days
pub const DEFAULT_REFRESH_TOKEN_VALIDITY_SECS: i64 = 2_592_000;

/// Default key alias inside the keystore
pub const DEFAULT_KEY_ALIAS: &str = "jwt";

/// Authorization server configuration, environment-only.
///
/// The keystore path and passphrase have no defaults; attempting to load key
/// material without them fails fatally at startup rather than per request.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Path to the passphrase-protected keystore file
    pub keystore_path: Option<PathBuf>,
    /// Passphrase protecting the keystore
    pub keystore_passphrase: Option<String>,
    /// Alias of the signing keypair inside the store
    pub key_alias: String,
    /// Default access token validity when a client sets none
    pub access_token_validity_secs: i64,
    /// Refresh token validity (always server-controlled)
    pub refresh_token_validity_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            keystore_path: None,
            keystore_passphrase: None,
            key_alias: DEFAULT_KEY_ALIAS.to_owned(),
            access_token_validity_secs: DEFAULT_ACCESS_TOKEN_VALIDITY_SECS,
            refresh_token_validity_secs: DEFAULT_REFRESH_TOKEN_VALIDITY_SECS,
        }
    }
}

impl AuthConfig {
    /// Load configuration from the environment.
    ///
    /// Recognized variables: `GATEKEY_KEYSTORE_PATH`,
    /// `GATEKEY_KEYSTORE_PASSPHRASE`, `GATEKEY_KEY_ALIAS`,
    /// `GATEKEY_ACCESS_TOKEN_VALIDITY_SECS`,
    /// `GATEKEY_REFRESH_TOKEN_VALIDITY_SECS`. Unparseable validity values
    /// fall back to defaults with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        let keystore_path = env::var("GATEKEY_KEYSTORE_PATH").ok().map(PathBuf::from);
        let keystore_passphrase = env::var("GATEKEY_KEYSTORE_PASSPHRASE").ok();

        let key_alias =
            env::var("GATEKEY_KEY_ALIAS").unwrap_or_else(|_| DEFAULT_KEY_ALIAS.to_owned());

        let access_token_validity_secs = Self::parse_validity(
            "GATEKEY_ACCESS_TOKEN_VALIDITY_SECS",
            DEFAULT_ACCESS_TOKEN_VALIDITY_SECS,
        );
        let refresh_token_validity_secs = Self::parse_validity(
            "GATEKEY_REFRESH_TOKEN_VALIDITY_SECS",
            DEFAULT_REFRESH_TOKEN_VALIDITY_SECS,
        );

        if keystore_path.is_none() {
            tracing::warn!("GATEKEY_KEYSTORE_PATH not set; key material cannot be loaded");
        }

        Self {
            keystore_path,
            keystore_passphrase,
            key_alias,
            access_token_validity_secs,
            refresh_token_validity_secs,
        }
    }

    fn parse_validity(var: &str, default: i64) -> i64 {
        match env::var(var) {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(var = %var, value = %raw, "invalid validity, using default");
                default
            }),
            Err(_) => default,
        }
    }
}
