// ABOUTME: Builds and signs token payloads for authenticated client/user pairs
// ABOUTME: Refresh issuance is the identical path with longer validity and a marker claim
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::crypto::KeyMaterial;
use crate::errors::AuthResult;
use crate::models::{Client, UserPrincipal};

/// Marker distinguishing access tokens from refresh artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    /// Bearer access token
    Access,
    /// Refresh artifact, exchangeable for a new token pair
    Refresh,
}

/// Signed token payload.
///
/// The `extra` map is the extensible claim set; it is only ever extended by
/// copying into a new map (see [`crate::token::enhance`]) because an issued
/// claim set may be referenced elsewhere concurrently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id for user-bound grants, client id otherwise
    pub sub: String,
    /// Client the token was issued to
    pub client_id: String,
    /// Granted scopes
    pub scope: BTreeSet<String>,
    /// Issuer-assigned unique token id
    pub jti: String,
    /// Issued-at timestamp (seconds since epoch)
    pub iat: i64,
    /// Expiry timestamp (seconds since epoch)
    pub exp: i64,
    /// Access/refresh marker
    pub token_use: TokenUse,
    /// Extensible claim map (e.g. the enhancer-added `email`)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Whether the token carries the given scope
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.contains(scope)
    }

    /// Space-delimited scope string for wire responses
    #[must_use]
    pub fn scope_string(&self) -> String {
        self.scope.iter().cloned().collect::<Vec<_>>().join(" ")
    }
}

/// A signed token: the compact JWT plus the claims it was signed over.
/// Immutable once signed.
#[derive(Debug, Clone)]
pub struct AccessToken {
    raw: String,
    claims: Claims,
}

impl AccessToken {
    pub(crate) fn new(raw: String, claims: Claims) -> Self {
        Self { raw, claims }
    }

    /// The compact JWT representation
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The claim set this token was signed over
    #[must_use]
    pub const fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Consume the token, yielding the compact JWT
    #[must_use]
    pub fn into_raw(self) -> String {
        self.raw
    }
}

/// Builds and signs tokens for already-authenticated parties.
///
/// Performs no client or user lookups; callers must have authenticated both
/// parties and computed the granted scope set beforehand.
pub struct TokenIssuer {
    keys: Arc<KeyMaterial>,
    default_access_validity_secs: i64,
    refresh_validity_secs: i64,
}

impl TokenIssuer {
    /// Create an issuer over the process-wide key material
    #[must_use]
    pub fn new(keys: Arc<KeyMaterial>, config: &AuthConfig) -> Self {
        Self {
            keys,
            default_access_validity_secs: config.access_token_validity_secs,
            refresh_validity_secs: config.refresh_token_validity_secs,
        }
    }

    /// Issue a signed access token for an authenticated (client, optional
    /// user) pair with the given granted scopes.
    ///
    /// # Errors
    /// Returns an error if RS256 signing fails
    pub fn issue(
        &self,
        client: &Client,
        user: Option<&UserPrincipal>,
        granted_scopes: &BTreeSet<String>,
    ) -> AuthResult<AccessToken> {
        let validity = client
            .access_token_validity_secs
            .unwrap_or(self.default_access_validity_secs);
        self.sign(client, user, granted_scopes, validity, TokenUse::Access)
    }

    /// Issue a refresh token: the identical path with the configured longer
    /// validity and the `refresh` marker claim.
    ///
    /// # Errors
    /// Returns an error if RS256 signing fails
    pub fn issue_refresh(
        &self,
        client: &Client,
        user: Option<&UserPrincipal>,
        granted_scopes: &BTreeSet<String>,
    ) -> AuthResult<AccessToken> {
        self.sign(
            client,
            user,
            granted_scopes,
            self.refresh_validity_secs,
            TokenUse::Refresh,
        )
    }

    /// Re-issue an access token from a validated refresh token's claim set,
    /// preserving subject, scopes, and enhancer-added claims.
    ///
    /// # Errors
    /// Returns an error if RS256 signing fails
    pub fn reissue_access(&self, client: &Client, refresh: &Claims) -> AuthResult<AccessToken> {
        let validity = client
            .access_token_validity_secs
            .unwrap_or(self.default_access_validity_secs);
        self.sign_from_claims(refresh, validity, TokenUse::Access)
    }

    /// Rotate a refresh token: a fresh refresh artifact carrying the same
    /// subject, scopes, and extra claims.
    ///
    /// # Errors
    /// Returns an error if RS256 signing fails
    pub fn rotate_refresh(&self, refresh: &Claims) -> AuthResult<AccessToken> {
        self.sign_from_claims(refresh, self.refresh_validity_secs, TokenUse::Refresh)
    }

    fn sign(
        &self,
        client: &Client,
        user: Option<&UserPrincipal>,
        granted_scopes: &BTreeSet<String>,
        validity_secs: i64,
        token_use: TokenUse,
    ) -> AuthResult<AccessToken> {
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: user.map_or_else(|| client.client_id.clone(), |u| u.id.to_string()),
            client_id: client.client_id.clone(),
            scope: granted_scopes.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + validity_secs,
            token_use,
            extra: HashMap::new(),
        };

        let raw = self.keys.encode_claims(&claims)?;
        tracing::debug!(
            client_id = %claims.client_id,
            sub = %claims.sub,
            jti = %claims.jti,
            token_use = ?token_use,
            "token issued"
        );
        Ok(AccessToken::new(raw, claims))
    }

    fn sign_from_claims(
        &self,
        source: &Claims,
        validity_secs: i64,
        token_use: TokenUse,
    ) -> AuthResult<AccessToken> {
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: source.sub.clone(),
            client_id: source.client_id.clone(),
            scope: source.scope.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + validity_secs,
            token_use,
            extra: source.extra.clone(),
        };

        let raw = self.keys.encode_claims(&claims)?;
        Ok(AccessToken::new(raw, claims))
    }
}
