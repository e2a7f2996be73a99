// ABOUTME: Keystore container tests: provisioning round trip and failure modes
// ABOUTME: Uses temporary directories so nothing touches a real keystore
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::path::PathBuf;

use common::{make_client, scopes, test_keys};

use gatekey::config::AuthConfig;
use gatekey::crypto::{KeyMaterial, KeyStore};
use gatekey::errors::AuthError;
use gatekey::models::GrantType;
use gatekey::token::{TokenIssuer, TokenValidator};

fn provision_store(dir: &tempfile::TempDir, passphrase: &str, alias: &str) -> PathBuf {
    let pem = KeyMaterial::generate_private_key_pem().expect("keygen");
    let mut store = KeyStore::create(passphrase).expect("create store");
    store.insert(alias, &pem).expect("insert key");

    let path = dir.path().join("keystore.json");
    store.save(&path).expect("save store");
    path
}

#[test]
fn provisioned_key_round_trips_through_the_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = provision_store(&dir, "hunter2", "jwt");

    let reopened = KeyStore::open(&path, "hunter2").expect("open store");
    assert_eq!(reopened.aliases(), vec!["jwt"]);

    let pem = reopened.private_key_pem("jwt").expect("decrypt entry");
    assert!(pem.contains("BEGIN PRIVATE KEY"));
}

#[test]
fn loaded_key_material_signs_tokens_that_validate() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = provision_store(&dir, "hunter2", "jwt");

    let keys = std::sync::Arc::new(
        KeyMaterial::load_from_store(&path, "hunter2", "jwt").expect("load key material"),
    );
    assert_eq!(keys.kid(), "jwt");

    let issuer = TokenIssuer::new(keys.clone(), &AuthConfig::default());
    let validator = TokenValidator::new(keys);

    let client = make_client("cid1", "s1", &[GrantType::ClientCredentials], &["read"], None);
    let token = issuer
        .issue(&client, None, &scopes(&["read"]))
        .expect("issue");
    assert!(validator.validate(token.raw()).is_ok());
}

#[test]
fn wrong_passphrase_is_key_material_unavailable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = provision_store(&dir, "hunter2", "jwt");

    let err = KeyMaterial::load_from_store(&path, "letmein", "jwt")
        .expect_err("wrong passphrase must not load");
    assert!(matches!(err, AuthError::KeyMaterialUnavailable { .. }));
}

#[test]
fn missing_alias_is_key_material_unavailable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = provision_store(&dir, "hunter2", "jwt");

    let err = KeyMaterial::load_from_store(&path, "hunter2", "signing")
        .expect_err("absent alias must not load");
    assert!(matches!(err, AuthError::KeyMaterialUnavailable { .. }));
}

#[test]
fn missing_store_file_is_key_material_unavailable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nope.json");

    let err = KeyMaterial::load_from_store(&path, "hunter2", "jwt")
        .expect_err("missing file must not load");
    assert!(matches!(err, AuthError::KeyMaterialUnavailable { .. }));
}

#[test]
fn unconfigured_paths_fail_fast_at_load() {
    let config = AuthConfig {
        keystore_path: None,
        keystore_passphrase: None,
        ..AuthConfig::default()
    };

    let err = KeyMaterial::load(&config).expect_err("nothing configured");
    assert!(matches!(err, AuthError::KeyMaterialUnavailable { .. }));
}

#[test]
fn corrupted_container_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("keystore.json");
    std::fs::write(&path, "{ not json").expect("write garbage");

    assert!(KeyStore::open(&path, "hunter2").is_err());
}

#[test]
fn jwk_matches_the_loaded_key() {
    let keys = test_keys();
    let jwk = keys.jwk();

    assert_eq!(jwk.kty, "RSA");
    assert_eq!(jwk.key_use, "sig");
    assert_eq!(jwk.kid, keys.kid());
    // base64url, no padding
    assert!(!jwk.n.contains('='));
    assert!(!jwk.e.contains('='));
}
