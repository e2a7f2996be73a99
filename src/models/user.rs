// ABOUTME: User principal model with account status flags and granted authorities
// ABOUTME: A principal failing any status flag never reaches token issuance
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Named authority granted to a user principal (many-to-many)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(pub String);

impl Permission {
    /// Build a permission from any string-like value
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// User principal as persisted by the external administrative process.
///
/// Status flags follow the classic account-status model: all four must hold
/// for the principal to authenticate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPrincipal {
    /// Unique user identifier
    pub id: Uuid,
    /// Login username
    pub username: String,
    /// User email address, also usable as a login identifier
    pub email: String,
    /// Bcrypt hash of the user password
    pub password_hash: String,
    /// Account is enabled
    pub enabled: bool,
    /// Account itself has not expired
    pub account_non_expired: bool,
    /// Account is not locked
    pub account_non_locked: bool,
    /// Credentials have not expired
    pub credentials_non_expired: bool,
    /// Granted authorities
    pub authorities: BTreeSet<Permission>,
}

impl UserPrincipal {
    /// Create an enabled principal with all status flags passing.
    /// Intended for provisioning helpers and tests.
    #[must_use]
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            enabled: true,
            account_non_expired: true,
            account_non_locked: true,
            credentials_non_expired: true,
            authorities: BTreeSet::new(),
        }
    }
}
