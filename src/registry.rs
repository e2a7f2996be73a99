// ABOUTME: Client registry resolving client ids and validating presented credentials
// ABOUTME: Enforces secret, grant-type, and scope checks in a fixed failure order
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Client authentication.
//!
//! Lookup goes through the [`ClientStore`] seam owned by the external
//! persistence layer; records are read-only here and authentication has no
//! side effects. The failure order is fixed: unknown client, bad secret,
//! unauthorized grant type, invalid scope.

use std::collections::BTreeSet;
use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::errors::{AuthError, AuthResult};
use crate::models::{Client, GrantType};

/// Read-only lookup of registered clients, implemented by the persistence
/// layer. Calls are synchronous and may block the calling unit of work.
pub trait ClientStore: Send + Sync {
    /// Fetch a client record by identifier; `Ok(None)` when unregistered
    ///
    /// # Errors
    /// Returns an error if the underlying store fails
    fn client_by_id(&self, client_id: &str) -> anyhow::Result<Option<Client>>;
}

/// Resolves and authenticates registered clients
pub struct ClientRegistry {
    store: Arc<dyn ClientStore>,
}

impl ClientRegistry {
    /// Create a registry over a client store
    #[must_use]
    pub fn new(store: Arc<dyn ClientStore>) -> Self {
        Self { store }
    }

    /// Authenticate a client for a grant request.
    ///
    /// Returns the validated client record with no side effects.
    ///
    /// # Errors
    /// `ClientNotFound` for an unknown id, `InvalidClientCredentials` on a
    /// secret mismatch, `UnauthorizedGrantType` if the client is not
    /// registered for `grant_type`, `InvalidScope` if any requested scope is
    /// outside the client's allowed set.
    pub fn authenticate(
        &self,
        client_id: &str,
        presented_secret: &str,
        grant_type: GrantType,
        requested_scopes: &BTreeSet<String>,
    ) -> AuthResult<Client> {
        tracing::debug!(client_id = %client_id, grant_type = %grant_type, "authenticating client");

        let client = self
            .store
            .client_by_id(client_id)?
            .ok_or(AuthError::ClientNotFound)?;

        Self::verify_secret(client_id, presented_secret, &client.secret_hash)?;

        if !client.grant_types.contains(&grant_type) {
            tracing::warn!(
                client_id = %client_id,
                grant_type = %grant_type,
                "client requested unauthorized grant type"
            );
            return Err(AuthError::UnauthorizedGrantType { grant_type });
        }

        for scope in requested_scopes {
            if !client.scopes.contains(scope) {
                tracing::warn!(client_id = %client_id, scope = %scope, "scope outside allowed set");
                return Err(AuthError::InvalidScope {
                    scope: scope.clone(),
                });
            }
        }

        tracing::debug!(client_id = %client_id, "client authenticated");
        Ok(client)
    }

    /// Verify a presented secret against the stored argon2 hash
    fn verify_secret(client_id: &str, presented: &str, stored_hash: &str) -> AuthResult<()> {
        let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
            tracing::error!(client_id = %client_id, error = %e, "stored secret hash is unparseable");
            AuthError::InvalidClientCredentials
        })?;

        if Argon2::default()
            .verify_password(presented.as_bytes(), &parsed_hash)
            .is_err()
        {
            tracing::warn!(client_id = %client_id, "client secret mismatch");
            return Err(AuthError::InvalidClientCredentials);
        }

        Ok(())
    }

    /// Hash a client secret for storage using Argon2id with a random salt.
    /// Provisioning helper; the registry itself only ever compares hashes.
    ///
    /// # Errors
    /// Returns an error if argon2 hashing fails
    pub fn hash_secret(secret: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(anyhow::anyhow!("argon2 hashing failed: {e}")))
    }
}
