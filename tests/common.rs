// ABOUTME: Shared fixtures for integration tests
// ABOUTME: In-memory client/user stores, ephemeral key material, and request builders
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use gatekey::config::AuthConfig;
use gatekey::crypto::KeyMaterial;
use gatekey::models::{Client, GrantType, TokenRequest, UserPrincipal};
use gatekey::principal::UserStore;
use gatekey::registry::{ClientRegistry, ClientStore};
use gatekey::server::AuthorizationServerCore;

/// Low bcrypt cost keeps the test suite fast
const TEST_BCRYPT_COST: u32 = 4;

pub struct InMemoryClientStore {
    clients: HashMap<String, Client>,
}

impl InMemoryClientStore {
    pub fn new(clients: Vec<Client>) -> Arc<Self> {
        Arc::new(Self {
            clients: clients
                .into_iter()
                .map(|c| (c.client_id.clone(), c))
                .collect(),
        })
    }
}

impl ClientStore for InMemoryClientStore {
    fn client_by_id(&self, client_id: &str) -> anyhow::Result<Option<Client>> {
        Ok(self.clients.get(client_id).cloned())
    }
}

pub struct InMemoryUserStore {
    users: Vec<UserPrincipal>,
}

impl InMemoryUserStore {
    pub fn new(users: Vec<UserPrincipal>) -> Arc<Self> {
        Arc::new(Self { users })
    }
}

impl UserStore for InMemoryUserStore {
    fn user_by_username(&self, username: &str) -> anyhow::Result<Option<UserPrincipal>> {
        Ok(self.users.iter().find(|u| u.username == username).cloned())
    }

    fn user_by_email(&self, email: &str) -> anyhow::Result<Option<UserPrincipal>> {
        Ok(self.users.iter().find(|u| u.email == email).cloned())
    }
}

pub fn test_keys() -> Arc<KeyMaterial> {
    Arc::new(KeyMaterial::generate("test_key").expect("test key generation"))
}

pub fn scopes(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

pub fn make_client(
    client_id: &str,
    secret: &str,
    grant_types: &[GrantType],
    allowed_scopes: &[&str],
    validity_secs: Option<i64>,
) -> Client {
    Client {
        client_id: client_id.to_owned(),
        secret_hash: ClientRegistry::hash_secret(secret).expect("argon2 hash"),
        grant_types: grant_types.iter().copied().collect(),
        scopes: scopes(allowed_scopes),
        access_token_validity_secs: validity_secs,
    }
}

pub fn make_user(username: &str, email: &str, password: &str) -> UserPrincipal {
    UserPrincipal::new(
        username.to_owned(),
        email.to_owned(),
        bcrypt::hash(password, TEST_BCRYPT_COST).expect("bcrypt hash"),
    )
}

pub fn build_core(
    keys: Arc<KeyMaterial>,
    clients: Vec<Client>,
    users: Vec<UserPrincipal>,
) -> AuthorizationServerCore {
    AuthorizationServerCore::new(
        keys,
        InMemoryClientStore::new(clients),
        InMemoryUserStore::new(users),
        &AuthConfig::default(),
    )
}

pub fn token_request(grant_type: &str, client_id: &str, client_secret: &str) -> TokenRequest {
    TokenRequest {
        grant_type: grant_type.to_owned(),
        client_id: client_id.to_owned(),
        client_secret: client_secret.to_owned(),
        scope: None,
        username: None,
        password: None,
        refresh_token: None,
        code: None,
    }
}

/// Flip one character of the signature segment so the payload still decodes
/// but the signature no longer verifies
pub fn tamper_signature(token: &str) -> String {
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3, "expected a compact JWT");

    let sig = parts[2];
    let replacement = if sig.as_bytes()[0] == b'A' { 'B' } else { 'A' };
    format!("{}.{}.{}{}", parts[0], parts[1], replacement, &sig[1..])
}
