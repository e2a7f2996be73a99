// ABOUTME: Offline token validation: signature, expiry, and scope sufficiency
// ABOUTME: Pure function of the token bytes and the process-wide public key
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, Validation};

use crate::crypto::KeyMaterial;
use crate::errors::{AuthError, AuthResult};
use crate::token::issuer::Claims;

/// Verifies tokens against the process-wide public key.
///
/// Validation performs no network or storage calls; it is a pure function of
/// the token bytes and the immutable [`KeyMaterial`].
pub struct TokenValidator {
    keys: Arc<KeyMaterial>,
}

impl TokenValidator {
    /// Create a validator over the process-wide key material
    #[must_use]
    pub fn new(keys: Arc<KeyMaterial>) -> Self {
        Self { keys }
    }

    /// Verify a token's signature and expiry, returning its claims.
    ///
    /// # Errors
    /// `InvalidSignature` when the signature does not verify,
    /// `MalformedToken` when the input is not a decodable JWT,
    /// `TokenExpired` once the current time reaches `exp`.
    pub fn validate(&self, raw_token: &str) -> AuthResult<Claims> {
        let claims = self.decode_claims(raw_token)?;

        let now = Utc::now();
        if now.timestamp() >= claims.exp {
            let expired_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);
            tracing::debug!(
                sub = %claims.sub,
                expired_at = %expired_at.to_rfc3339(),
                "token expired"
            );
            return Err(AuthError::TokenExpired { expired_at });
        }

        Ok(claims)
    }

    /// Verify a token and additionally require `required_scope` among its
    /// granted scopes.
    ///
    /// # Errors
    /// Everything [`TokenValidator::validate`] returns, plus
    /// `InsufficientScope` when the scope is missing.
    pub fn validate_scoped(&self, raw_token: &str, required_scope: &str) -> AuthResult<Claims> {
        let claims = self.validate(raw_token)?;

        if !claims.has_scope(required_scope) {
            tracing::warn!(
                sub = %claims.sub,
                required = %required_scope,
                "token lacks required scope"
            );
            return Err(AuthError::InsufficientScope {
                required: required_scope.to_owned(),
            });
        }

        Ok(claims)
    }

    /// Decode with signature verification but expiry deferred, so expiry can
    /// be reported distinctly from signature failures.
    fn decode_claims(&self, raw_token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.validate_aud = false;

        decode::<Claims>(raw_token, self.keys.decoding_key(), &validation)
            .map(|data| data.claims)
            .map_err(|e| Self::convert_jwt_error(&e))
    }

    /// Map jsonwebtoken errors onto the validation taxonomy
    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> AuthError {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::InvalidSignature => {
                tracing::warn!("token signature verification failed");
                AuthError::InvalidSignature
            }
            ErrorKind::InvalidToken => AuthError::MalformedToken {
                details: "token format is invalid".to_owned(),
            },
            ErrorKind::Base64(base64_err) => AuthError::MalformedToken {
                details: format!("token contains invalid base64: {base64_err}"),
            },
            ErrorKind::Json(json_err) => AuthError::MalformedToken {
                details: format!("token contains invalid JSON: {json_err}"),
            },
            ErrorKind::Utf8(utf8_err) => AuthError::MalformedToken {
                details: format!("token contains invalid UTF-8: {utf8_err}"),
            },
            _ => {
                tracing::warn!(error = ?e, "token validation failed");
                AuthError::InvalidSignature
            }
        }
    }
}
