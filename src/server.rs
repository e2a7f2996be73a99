// ABOUTME: Authorization server core orchestrating client/user auth and the token pipeline
// ABOUTME: Explicit access-policy table for the token, token-key, and check-token operations
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Authorization Server Core
//!
//! Per-call, stateless orchestration of the grant pipeline:
//! client authentication, optional user authentication, token issuance,
//! claim enhancement. Each operation carries an explicit access policy,
//! evaluated before dispatch, replacing declarative framework wiring with a
//! small tagged-policy table.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::crypto::KeyMaterial;
use crate::errors::{AuthError, AuthResult};
use crate::models::{
    Client, GrantType, IntrospectionResponse, TokenKeyResponse, TokenRequest, TokenResponse,
};
use crate::principal::{self, UserPrincipalStore, UserStore};
use crate::registry::{ClientRegistry, ClientStore};
use crate::token::{enhance, AccessToken, TokenIssuer, TokenUse, TokenValidator};

/// Operations this core exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Token issuance (grant endpoint)
    IssueToken,
    /// Public verification key retrieval
    TokenKey,
    /// Token introspection (check token)
    CheckToken,
}

/// Access requirement for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Any caller, unauthenticated
    PermitAll,
    /// Caller must authenticate as a registered client
    ClientAuthenticated,
    /// Caller must present a valid bearer token
    BearerAuthenticated,
}

impl Operation {
    /// The tagged-policy table: which access policy guards each operation
    #[must_use]
    pub const fn access_policy(self) -> AccessPolicy {
        match self {
            Self::IssueToken => AccessPolicy::ClientAuthenticated,
            Self::TokenKey => AccessPolicy::PermitAll,
            Self::CheckToken => AccessPolicy::BearerAuthenticated,
        }
    }
}

/// Orchestrates client/user authentication and the token pipeline.
///
/// Request handling is per-call and stateless; the only shared resource is
/// the immutable [`KeyMaterial`] behind an `Arc`.
pub struct AuthorizationServerCore {
    clients: ClientRegistry,
    users: UserPrincipalStore,
    issuer: TokenIssuer,
    validator: TokenValidator,
    keys: Arc<KeyMaterial>,
}

impl AuthorizationServerCore {
    /// Assemble the core over loaded key material and the persistence seams
    #[must_use]
    pub fn new(
        keys: Arc<KeyMaterial>,
        client_store: Arc<dyn ClientStore>,
        user_store: Arc<dyn UserStore>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            clients: ClientRegistry::new(client_store),
            users: UserPrincipalStore::new(user_store),
            issuer: TokenIssuer::new(Arc::clone(&keys), config),
            validator: TokenValidator::new(Arc::clone(&keys)),
            keys,
        }
    }

    /// Evaluate an operation's access policy against the caller's bearer
    /// token, if any. Client authentication for [`Operation::IssueToken`] is
    /// enforced inside the grant pipeline itself, where the client
    /// credentials live.
    fn enforce_policy(&self, operation: Operation, bearer: Option<&str>) -> AuthResult<()> {
        match operation.access_policy() {
            AccessPolicy::PermitAll | AccessPolicy::ClientAuthenticated => Ok(()),
            AccessPolicy::BearerAuthenticated => {
                let raw = bearer.ok_or_else(|| AuthError::InvalidRequest {
                    reason: "operation requires a bearer token".to_owned(),
                })?;
                self.validator.validate(raw)?;
                Ok(())
            }
        }
    }

    /// Handle a token grant request.
    ///
    /// Always authenticates the client; user-bound grants additionally
    /// authenticate the user. The granted scope set is the requested set when
    /// present (validated against the client's allowed set), else the
    /// client's full allowed set.
    ///
    /// # Errors
    /// Any per-request error from §taxonomy; never a partial token.
    pub fn token(&self, request: &TokenRequest) -> AuthResult<TokenResponse> {
        let grant_type: GrantType = request.grant_type.parse()?;
        let requested = parse_scope(request.scope.as_deref());

        let client = self.clients.authenticate(
            &request.client_id,
            &request.client_secret,
            grant_type,
            &requested,
        )?;

        let granted = if requested.is_empty() {
            client.scopes.clone()
        } else {
            requested
        };

        match grant_type {
            GrantType::Password => self.password_grant(&client, request, &granted),
            GrantType::ClientCredentials => self.client_credentials_grant(&client, &granted),
            GrantType::RefreshToken => self.refresh_grant(&client, request),
            // The code exchange belongs to the excluded web-flow layer; this
            // core has no authorization-code store.
            GrantType::AuthorizationCode => {
                tracing::warn!(client_id = %client.client_id, "authorization_code exchange not handled by this core");
                Err(AuthError::UnsupportedGrantType {
                    grant_type: GrantType::AuthorizationCode.as_str().to_owned(),
                })
            }
        }
    }

    /// Resource-owner password grant: resolve and verify the user, issue,
    /// enhance, and attach a refresh token carrying the enhanced claims.
    fn password_grant(
        &self,
        client: &Client,
        request: &TokenRequest,
        granted: &BTreeSet<String>,
    ) -> AuthResult<TokenResponse> {
        let username = request
            .username
            .as_deref()
            .ok_or_else(|| missing_parameter("username"))?;
        let password = request
            .password
            .as_deref()
            .ok_or_else(|| missing_parameter("password"))?;

        let user = self.users.resolve(username)?;
        principal::verify_password(&user, password)?;

        let access = self.issuer.issue(client, Some(&user), granted)?;
        let access = enhance(&access, &user, &self.keys)?;

        let refresh = self.issuer.issue_refresh(client, Some(&user), granted)?;
        let refresh = enhance(&refresh, &user, &self.keys)?;

        tracing::info!(
            client_id = %client.client_id,
            username = %user.username,
            "password grant succeeded"
        );
        Ok(build_response(access, Some(refresh.into_raw())))
    }

    /// Client-credentials grant: no user, no enhancement, no refresh token
    fn client_credentials_grant(
        &self,
        client: &Client,
        granted: &BTreeSet<String>,
    ) -> AuthResult<TokenResponse> {
        let access = self.issuer.issue(client, None, granted)?;

        tracing::info!(client_id = %client.client_id, "client_credentials grant succeeded");
        Ok(build_response(access, None))
    }

    /// Refresh grant: validate the presented refresh artifact, then re-issue
    /// an access token and a rotated refresh token from its claim set.
    fn refresh_grant(&self, client: &Client, request: &TokenRequest) -> AuthResult<TokenResponse> {
        let raw = request
            .refresh_token
            .as_deref()
            .ok_or_else(|| missing_parameter("refresh_token"))?;

        let claims = self.validator.validate(raw)?;

        if claims.token_use != TokenUse::Refresh {
            return Err(AuthError::InvalidRequest {
                reason: "presented token is not a refresh token".to_owned(),
            });
        }
        if claims.client_id != client.client_id {
            tracing::warn!(
                client_id = %client.client_id,
                token_client = %claims.client_id,
                "refresh token was issued to a different client"
            );
            return Err(AuthError::InvalidRequest {
                reason: "refresh token was issued to a different client".to_owned(),
            });
        }

        let access = self.issuer.reissue_access(client, &claims)?;
        let rotated = self.issuer.rotate_refresh(&claims)?;

        tracing::info!(client_id = %client.client_id, sub = %claims.sub, "refresh grant succeeded");
        Ok(build_response(access, Some(rotated.into_raw())))
    }

    /// Public key retrieval: permitted to any caller, returns only the
    /// public half of the keypair.
    ///
    /// # Errors
    /// Never fails for the permit-all policy; kept fallible for uniform
    /// operation dispatch at the boundary.
    pub fn token_key(&self) -> AuthResult<TokenKeyResponse> {
        self.enforce_policy(Operation::TokenKey, None)?;

        Ok(TokenKeyResponse {
            alg: "RS256".to_owned(),
            value: self.keys.public_key_pem().to_owned(),
            jwk: self.keys.jwk(),
        })
    }

    /// Token introspection: the caller must present a valid bearer token
    /// before learning anything about the subject token. An invalid, expired,
    /// or malformed subject token yields `active = false`, not an error.
    ///
    /// # Errors
    /// Fails when the caller's own bearer token is missing or invalid
    pub fn check_token(
        &self,
        caller_bearer: Option<&str>,
        subject_token: &str,
    ) -> AuthResult<IntrospectionResponse> {
        self.enforce_policy(Operation::CheckToken, caller_bearer)?;

        match self.validator.validate(subject_token) {
            Ok(claims) => Ok(IntrospectionResponse::active(&claims)),
            Err(
                AuthError::TokenExpired { .. }
                | AuthError::InvalidSignature
                | AuthError::MalformedToken { .. },
            ) => Ok(IntrospectionResponse::inactive()),
            Err(e) => Err(e),
        }
    }

    /// The validator, for scope-gated resource checks at the boundary
    #[must_use]
    pub const fn validator(&self) -> &TokenValidator {
        &self.validator
    }
}

/// Split a space-delimited scope parameter into a set
fn parse_scope(scope: Option<&str>) -> BTreeSet<String> {
    scope
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

fn missing_parameter(name: &str) -> AuthError {
    AuthError::InvalidRequest {
        reason: format!("missing required parameter '{name}'"),
    }
}

fn build_response(access: AccessToken, refresh_token: Option<String>) -> TokenResponse {
    let claims = access.claims();
    TokenResponse {
        expires_in: claims.exp - claims.iat,
        scope: claims.scope_string(),
        token_type: "Bearer".to_owned(),
        refresh_token,
        access_token: access.into_raw(),
    }
}
