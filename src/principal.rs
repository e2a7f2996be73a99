// ABOUTME: User principal resolution by username or email with account status gating
// ABOUTME: Status checks run in fixed order: disabled, expired, credentials, locked
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! User principal resolution.
//!
//! Login identifiers route by a documented heuristic: anything containing an
//! `@` is looked up by email, everything else by username. Account status is
//! checked in a fixed order so a principal violating several flags always
//! fails with the first one.

use std::sync::Arc;

use crate::errors::{AuthError, AuthResult};
use crate::models::UserPrincipal;

/// How a login identifier is routed to storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// Look up by username
    Username,
    /// Look up by email address
    Email,
}

/// Classify a login identifier for lookup routing.
///
/// Heuristic: an identifier containing `@` is treated as an email. Known edge
/// case: a username that legitimately contains `@` (e.g. `"a@b"`) is
/// misrouted to email lookup and fails to resolve even though the account
/// exists. This matches the historical behavior and is preserved as-is.
#[must_use]
pub fn classify_identifier(login: &str) -> IdentifierKind {
    if login.contains('@') {
        IdentifierKind::Email
    } else {
        IdentifierKind::Username
    }
}

/// Read-only lookup of user principals, implemented by the persistence
/// layer. Calls are synchronous and may block the calling unit of work.
pub trait UserStore: Send + Sync {
    /// Fetch a principal by username; `Ok(None)` when absent
    ///
    /// # Errors
    /// Returns an error if the underlying store fails
    fn user_by_username(&self, username: &str) -> anyhow::Result<Option<UserPrincipal>>;

    /// Fetch a principal by email; `Ok(None)` when absent
    ///
    /// # Errors
    /// Returns an error if the underlying store fails
    fn user_by_email(&self, email: &str) -> anyhow::Result<Option<UserPrincipal>>;
}

/// Resolves login identifiers to user principals and gates on account status
pub struct UserPrincipalStore {
    store: Arc<dyn UserStore>,
}

impl UserPrincipalStore {
    /// Create a principal store over a user store
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Resolve a login identifier to a principal whose account status passes.
    ///
    /// # Errors
    /// `UserNotFound` when no record matches (surfaced generically as bad
    /// credentials at the wire), or the first violated account status error
    /// in the order: disabled, account-expired, credentials-expired, locked.
    pub fn resolve(&self, login: &str) -> AuthResult<UserPrincipal> {
        let user = match classify_identifier(login) {
            IdentifierKind::Email => {
                tracing::debug!(login = %login, "resolving principal by email");
                self.store.user_by_email(login)?
            }
            IdentifierKind::Username => {
                tracing::debug!(login = %login, "resolving principal by username");
                self.store.user_by_username(login)?
            }
        };

        let user = user.ok_or_else(|| {
            tracing::debug!(login = %login, "no principal matches login identifier");
            AuthError::UserNotFound
        })?;

        check_account_status(&user)?;
        Ok(user)
    }
}

/// Account status gate, fixed order. A principal failing any flag never
/// reaches token issuance.
fn check_account_status(user: &UserPrincipal) -> AuthResult<()> {
    if !user.enabled {
        tracing::warn!(username = %user.username, "account disabled");
        return Err(AuthError::AccountDisabled);
    }
    if !user.account_non_expired {
        tracing::warn!(username = %user.username, "account expired");
        return Err(AuthError::AccountExpired);
    }
    if !user.credentials_non_expired {
        tracing::warn!(username = %user.username, "credentials expired");
        return Err(AuthError::CredentialsExpired);
    }
    if !user.account_non_locked {
        tracing::warn!(username = %user.username, "account locked");
        return Err(AuthError::AccountLocked);
    }
    Ok(())
}

/// Verify a presented password against the principal's bcrypt hash.
///
/// # Errors
/// `InvalidUserCredentials` on mismatch (indistinguishable from
/// `UserNotFound` at the wire), `Internal` if the stored hash is unparseable.
pub fn verify_password(user: &UserPrincipal, presented: &str) -> AuthResult<()> {
    match bcrypt::verify(presented, &user.password_hash) {
        Ok(true) => Ok(()),
        Ok(false) => {
            tracing::warn!(username = %user.username, "password mismatch");
            Err(AuthError::InvalidUserCredentials)
        }
        Err(e) => Err(AuthError::Internal(anyhow::anyhow!(
            "stored password hash is unparseable: {e}"
        ))),
    }
}

/// Hash a user password for storage with bcrypt at the default cost.
/// Provisioning helper; resolution only ever compares hashes.
///
/// # Errors
/// Returns an error if bcrypt hashing fails
pub fn hash_password(password: &str) -> AuthResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AuthError::Internal(anyhow::anyhow!("bcrypt hashing failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_with_at_sign_routes_to_email() {
        assert_eq!(
            classify_identifier("alice@example.com"),
            IdentifierKind::Email
        );
        assert_eq!(classify_identifier("alice"), IdentifierKind::Username);
        // Documented edge case: usernames containing '@' route to email lookup
        assert_eq!(classify_identifier("a@b"), IdentifierKind::Email);
    }
}
