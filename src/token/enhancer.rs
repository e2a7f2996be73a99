// ABOUTME: Augments an issued token's claim set with identity-derived information
// ABOUTME: Pure transformation: copies the claim map, never mutates the input token
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use serde_json::Value;

use crate::crypto::KeyMaterial;
use crate::errors::AuthResult;
use crate::models::UserPrincipal;
use crate::token::issuer::{AccessToken, Claims};

/// Extend a token's claim set with the principal's `email` and re-sign.
///
/// The existing claim map is copied into a new map before insertion; the
/// input token and its claims are never mutated, since concurrent holders of
/// the original may still be reading them. Claim changes invalidate the prior
/// signature, so the returned token carries a freshly computed one.
///
/// Idempotent in effect: enhancing an already-enhanced token yields the same
/// claim values, but the map is always rebuilt rather than updated in place.
///
/// # Errors
/// Returns an error if RS256 re-signing fails
pub fn enhance(
    token: &AccessToken,
    user: &UserPrincipal,
    keys: &KeyMaterial,
) -> AuthResult<AccessToken> {
    let mut extra = token.claims().extra.clone();
    extra.insert("email".to_owned(), Value::String(user.email.clone()));

    let claims = Claims {
        extra,
        ..token.claims().clone()
    };

    let raw = keys.encode_claims(&claims)?;
    Ok(AccessToken::new(raw, claims))
}
