// ABOUTME: Registered OAuth client model and supported grant types
// ABOUTME: Clients carry an argon2 secret hash, never a plaintext secret
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AuthError;

/// OAuth 2.0 grant type a client may be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Resource-owner password credentials (user-bound)
    Password,
    /// Client credentials, no user involved
    ClientCredentials,
    /// Authorization code (user-bound, exchanged by the web-flow layer)
    AuthorizationCode,
    /// Refresh of a previously issued token pair
    RefreshToken,
}

impl GrantType {
    /// Whether this grant binds a user principal to the issued token
    #[must_use]
    pub const fn is_user_bound(self) -> bool {
        matches!(self, Self::Password | Self::AuthorizationCode)
    }

    /// String form used on the wire and in client registrations
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::ClientCredentials => "client_credentials",
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl Display for GrantType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrantType {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "password" => Ok(Self::Password),
            "client_credentials" => Ok(Self::ClientCredentials),
            "authorization_code" => Ok(Self::AuthorizationCode),
            "refresh_token" => Ok(Self::RefreshToken),
            other => Err(AuthError::UnsupportedGrantType {
                grant_type: other.to_owned(),
            }),
        }
    }
}

/// Registered OAuth client, as persisted by the external administrative
/// process and read here per authentication attempt.
///
/// The secret is never stored or transmitted in plaintext; only the argon2
/// hash is persisted and compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Unique client identifier
    pub client_id: String,
    /// Argon2 PHC-format hash of the client secret
    pub secret_hash: String,
    /// Grant types this client may use
    pub grant_types: BTreeSet<GrantType>,
    /// Scopes this client may request
    pub scopes: BTreeSet<String>,
    /// Access token validity in seconds; `None` uses the server default
    pub access_token_validity_secs: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_type_round_trips_through_wire_form() {
        for gt in [
            GrantType::Password,
            GrantType::ClientCredentials,
            GrantType::AuthorizationCode,
            GrantType::RefreshToken,
        ] {
            assert_eq!(gt.as_str().parse::<GrantType>().unwrap(), gt);
        }
    }

    #[test]
    fn unknown_grant_type_is_rejected() {
        let err = "implicit".parse::<GrantType>().unwrap_err();
        assert!(matches!(
            err,
            AuthError::UnsupportedGrantType { grant_type } if grant_type == "implicit"
        ));
    }

    #[test]
    fn user_bound_grants() {
        assert!(GrantType::Password.is_user_bound());
        assert!(GrantType::AuthorizationCode.is_user_bound());
        assert!(!GrantType::ClientCredentials.is_user_bound());
        assert!(!GrantType::RefreshToken.is_user_bound());
    }
}
