// ABOUTME: Error taxonomy for client/user authentication and token validation
// ABOUTME: Maps internal error causes to RFC 6749 wire-level error responses
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Authorization Error Taxonomy
//!
//! Every per-request failure in the core is a discriminated [`AuthError`]
//! returned up to the boundary layer; the core never retries. The only fatal
//! variant is [`AuthError::KeyMaterialUnavailable`], raised exclusively at
//! startup when the signing keypair cannot be loaded.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::models::GrantType;

/// Discriminated authorization failure, surfaced to the boundary layer
#[derive(Debug, Error)]
pub enum AuthError {
    /// No client registered under the presented identifier
    #[error("client not found")]
    ClientNotFound,

    /// Presented client secret does not match the stored hash
    #[error("invalid client credentials")]
    InvalidClientCredentials,

    /// Client is not registered for the requested grant type
    #[error("grant type '{grant_type}' not authorized for this client")]
    UnauthorizedGrantType {
        /// The grant type the client asked for
        grant_type: GrantType,
    },

    /// A requested scope is outside the client's allowed set
    #[error("scope '{scope}' exceeds the client's allowed scopes")]
    InvalidScope {
        /// First offending scope
        scope: String,
    },

    /// No user matches the login identifier (kept distinct internally,
    /// collapsed to generic bad credentials at the wire)
    #[error("user not found")]
    UserNotFound,

    /// Presented password does not match the stored hash
    #[error("invalid user credentials")]
    InvalidUserCredentials,

    /// Account is disabled
    #[error("user account is disabled")]
    AccountDisabled,

    /// Account has expired
    #[error("user account has expired")]
    AccountExpired,

    /// Credentials have expired
    #[error("user credentials have expired")]
    CredentialsExpired,

    /// Account is locked
    #[error("user account is locked")]
    AccountLocked,

    /// Token signature does not verify against the public key
    #[error("token signature is invalid")]
    InvalidSignature,

    /// Token expiry instant has passed
    #[error("token expired at {expired_at}")]
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },

    /// Token bytes are not a decodable JWT at all
    #[error("token is malformed: {details}")]
    MalformedToken {
        /// Details about the malformation
        details: String,
    },

    /// Token does not carry the scope required for the operation
    #[error("token lacks required scope '{required}'")]
    InsufficientScope {
        /// The scope the operation requires
        required: String,
    },

    /// Grant type string is not one this server understands
    #[error("unsupported grant type '{grant_type}'")]
    UnsupportedGrantType {
        /// The raw grant type from the request
        grant_type: String,
    },

    /// Request is missing or misusing a required parameter
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// What was missing or wrong
        reason: String,
    },

    /// Signing keypair could not be loaded at startup. Fatal: the process
    /// must not accept requests in this state.
    #[error("key material unavailable: {reason}")]
    KeyMaterialUnavailable {
        /// Underlying cause (missing store, wrong passphrase, absent alias)
        reason: String,
    },

    /// Failure inside an external store or crypto primitive
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Per-request result alias
pub type AuthResult<T> = Result<T, AuthError>;

/// RFC 6749 error response body, serialized by the boundary layer
#[derive(Debug, Clone, Serialize)]
pub struct OAuth2ErrorResponse {
    /// RFC 6749 error code
    pub error: String,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl OAuth2ErrorResponse {
    fn new(error: &str, description: &str) -> Self {
        Self {
            error: error.to_owned(),
            error_description: Some(description.to_owned()),
        }
    }
}

impl AuthError {
    /// Map this error to its RFC 6749 wire representation.
    ///
    /// `UserNotFound` and `InvalidUserCredentials` deliberately produce the
    /// same generic response so callers cannot enumerate which login
    /// identifiers exist.
    #[must_use]
    pub fn to_oauth2_error(&self) -> OAuth2ErrorResponse {
        match self {
            Self::ClientNotFound | Self::InvalidClientCredentials => {
                OAuth2ErrorResponse::new("invalid_client", "Client authentication failed")
            }
            Self::UnauthorizedGrantType { grant_type } => OAuth2ErrorResponse::new(
                "unauthorized_client",
                &format!("Client is not authorized for grant type '{grant_type}'"),
            ),
            Self::InvalidScope { scope } => OAuth2ErrorResponse::new(
                "invalid_scope",
                &format!("Requested scope '{scope}' is not allowed"),
            ),
            Self::UserNotFound | Self::InvalidUserCredentials => {
                OAuth2ErrorResponse::new("invalid_grant", "Bad credentials")
            }
            Self::AccountDisabled => {
                OAuth2ErrorResponse::new("invalid_grant", "User account is disabled")
            }
            Self::AccountExpired => {
                OAuth2ErrorResponse::new("invalid_grant", "User account has expired")
            }
            Self::CredentialsExpired => {
                OAuth2ErrorResponse::new("invalid_grant", "User credentials have expired")
            }
            Self::AccountLocked => {
                OAuth2ErrorResponse::new("invalid_grant", "User account is locked")
            }
            Self::InvalidSignature => {
                OAuth2ErrorResponse::new("invalid_token", "Token signature verification failed")
            }
            Self::TokenExpired { .. } => {
                OAuth2ErrorResponse::new("invalid_token", "Token has expired")
            }
            Self::MalformedToken { details } => OAuth2ErrorResponse::new(
                "invalid_token",
                &format!("Token is malformed: {details}"),
            ),
            Self::InsufficientScope { required } => OAuth2ErrorResponse::new(
                "insufficient_scope",
                &format!("Operation requires scope '{required}'"),
            ),
            Self::UnsupportedGrantType { .. } => {
                OAuth2ErrorResponse::new("unsupported_grant_type", "Grant type not supported")
            }
            Self::InvalidRequest { reason } => {
                OAuth2ErrorResponse::new("invalid_request", reason)
            }
            Self::KeyMaterialUnavailable { .. } | Self::Internal(_) => {
                OAuth2ErrorResponse::new("server_error", "Internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_not_found_and_bad_password_are_indistinguishable_on_the_wire() {
        let not_found = AuthError::UserNotFound.to_oauth2_error();
        let bad_password = AuthError::InvalidUserCredentials.to_oauth2_error();

        assert_eq!(not_found.error, bad_password.error);
        assert_eq!(not_found.error_description, bad_password.error_description);
        assert_eq!(not_found.error, "invalid_grant");
    }

    #[test]
    fn client_failures_map_to_invalid_client() {
        assert_eq!(
            AuthError::ClientNotFound.to_oauth2_error().error,
            "invalid_client"
        );
        assert_eq!(
            AuthError::InvalidClientCredentials.to_oauth2_error().error,
            "invalid_client"
        );
    }
}
