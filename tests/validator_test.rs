// ABOUTME: Offline validation tests: signature, expiry, malformed input, and scope gating
// ABOUTME: Exercises the validator directly against issuer-produced tokens
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use common::{make_client, make_user, scopes, tamper_signature, test_keys};

use gatekey::config::AuthConfig;
use gatekey::crypto::KeyMaterial;
use gatekey::errors::AuthError;
use gatekey::models::GrantType;
use gatekey::token::{TokenIssuer, TokenValidator};

fn issuer_and_validator() -> (TokenIssuer, TokenValidator) {
    let keys = test_keys();
    (
        TokenIssuer::new(keys.clone(), &AuthConfig::default()),
        TokenValidator::new(keys),
    )
}

#[test]
fn issued_token_validates_and_round_trips_claims() {
    let (issuer, validator) = issuer_and_validator();
    let client = make_client("cid1", "s1", &[GrantType::ClientCredentials], &["read"], None);

    let token = issuer
        .issue(&client, None, &scopes(&["read"]))
        .expect("issue");
    let claims = validator.validate(token.raw()).expect("validate");

    assert_eq!(claims.sub, "cid1");
    assert_eq!(claims.client_id, "cid1");
    assert_eq!(claims.jti, token.claims().jti);
    assert!(claims.exp > claims.iat);
}

#[test]
fn user_bound_token_carries_the_user_id_as_subject() {
    let (issuer, validator) = issuer_and_validator();
    let client = make_client("web", "s1", &[GrantType::Password], &["read"], None);
    let user = make_user("bob", "bob@x.com", "pw");

    let token = issuer
        .issue(&client, Some(&user), &scopes(&["read"]))
        .expect("issue");
    let claims = validator.validate(token.raw()).expect("validate");

    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.client_id, "web");
}

#[test]
fn expired_token_is_reported_as_expired() {
    let (issuer, validator) = issuer_and_validator();
    let client = make_client(
        "cid1",
        "s1",
        &[GrantType::ClientCredentials],
        &["read"],
        Some(-5),
    );

    let token = issuer
        .issue(&client, None, &scopes(&["read"]))
        .expect("issuance itself succeeds");

    let err = validator.validate(token.raw()).expect_err("must be expired");
    assert!(matches!(err, AuthError::TokenExpired { .. }));
}

#[test]
fn tampered_signature_is_rejected() {
    let (issuer, validator) = issuer_and_validator();
    let client = make_client("cid1", "s1", &[GrantType::ClientCredentials], &["read"], None);

    let token = issuer
        .issue(&client, None, &scopes(&["read"]))
        .expect("issue");

    let err = validator
        .validate(&tamper_signature(token.raw()))
        .expect_err("flipped signature byte");
    assert!(matches!(err, AuthError::InvalidSignature));
}

#[test]
fn token_signed_by_a_different_key_is_rejected() {
    let (issuer, _) = issuer_and_validator();
    let client = make_client("cid1", "s1", &[GrantType::ClientCredentials], &["read"], None);

    let token = issuer
        .issue(&client, None, &scopes(&["read"]))
        .expect("issue");

    let other_keys = std::sync::Arc::new(KeyMaterial::generate("other_key").expect("keygen"));
    let foreign_validator = TokenValidator::new(other_keys);

    let err = foreign_validator
        .validate(token.raw())
        .expect_err("wrong verification key");
    assert!(matches!(err, AuthError::InvalidSignature));
}

#[test]
fn garbage_input_is_malformed_not_a_signature_failure() {
    let (_, validator) = issuer_and_validator();

    for garbage in ["", "not-a-jwt", "a.b", "%%%.%%%.%%%"] {
        let err = validator.validate(garbage).expect_err("undecodable input");
        assert!(
            matches!(err, AuthError::MalformedToken { .. }),
            "expected MalformedToken for {garbage:?}, got {err:?}"
        );
    }
}

#[test]
fn scope_gated_validation_requires_the_scope() {
    let (issuer, validator) = issuer_and_validator();
    let client = make_client(
        "cid1",
        "s1",
        &[GrantType::ClientCredentials],
        &["read", "write"],
        None,
    );

    let token = issuer
        .issue(&client, None, &scopes(&["read"]))
        .expect("issue");

    assert!(validator.validate_scoped(token.raw(), "read").is_ok());

    let err = validator
        .validate_scoped(token.raw(), "write")
        .expect_err("write was not granted");
    assert!(matches!(err, AuthError::InsufficientScope { required } if required == "write"));
}
