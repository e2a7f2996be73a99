// ABOUTME: Request/response shapes for the grant, token-key, and check-token operations
// ABOUTME: Mirrors RFC 6749 token responses and RFC 7662 introspection output
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use serde::{Deserialize, Serialize};

use crate::crypto::JsonWebKey;
use crate::token::Claims;

/// Token grant request (POST body of the token endpoint)
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    /// Grant type string (`password`, `client_credentials`,
    /// `authorization_code`, `refresh_token`)
    pub grant_type: String,
    /// Client identifier
    pub client_id: String,
    /// Client secret, presented over the credential channel
    pub client_secret: String,
    /// Space-delimited requested scopes; empty requests the client's full set
    pub scope: Option<String>,
    /// Login identifier for the `password` grant (username or email)
    pub username: Option<String>,
    /// Password for the `password` grant
    pub password: Option<String>,
    /// Refresh token for the `refresh_token` grant
    pub refresh_token: Option<String>,
    /// Authorization code artifact (exchanged by the web-flow layer)
    pub code: Option<String>,
}

/// Successful token grant response
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    /// Signed access token (compact JWT)
    pub access_token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
    /// Space-delimited granted scopes
    pub scope: String,
    /// Refresh token, present for user-bound grants
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Token introspection result (check-token operation)
#[derive(Debug, Clone, Serialize)]
pub struct IntrospectionResponse {
    /// Whether the subject token is currently valid
    pub active: bool,
    /// Token subject (user id if user-bound, else client id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Client the token was issued to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Space-delimited granted scopes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Expiry timestamp (seconds since epoch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issued-at timestamp (seconds since epoch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Enhancer-added email claim, when present on the token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl IntrospectionResponse {
    /// Build an active introspection result from validated claims
    #[must_use]
    pub fn active(claims: &Claims) -> Self {
        let email = claims
            .extra
            .get("email")
            .and_then(|v| v.as_str())
            .map(str::to_owned);

        Self {
            active: true,
            sub: Some(claims.sub.clone()),
            client_id: Some(claims.client_id.clone()),
            scope: Some(claims.scope_string()),
            exp: Some(claims.exp),
            iat: Some(claims.iat),
            email,
        }
    }

    /// Build an inactive result: the subject token failed validation.
    /// No metadata is disclosed about inactive tokens.
    #[must_use]
    pub const fn inactive() -> Self {
        Self {
            active: false,
            sub: None,
            client_id: None,
            scope: None,
            exp: None,
            iat: None,
            email: None,
        }
    }
}

/// Public verification key in exportable formats (token-key operation)
#[derive(Debug, Clone, Serialize)]
pub struct TokenKeyResponse {
    /// Signing algorithm the key verifies
    pub alg: String,
    /// Public key as SPKI PEM
    pub value: String,
    /// Public key as a JSON Web Key
    pub jwk: JsonWebKey,
}
