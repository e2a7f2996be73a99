// ABOUTME: Stateless OAuth2-style authorization server core library
// ABOUTME: RS256 JWT issuance, claim enhancement, and offline validation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # gatekey
//!
//! An OAuth2-style authorization server core: it authenticates registered
//! clients and end users, issues RS256-signed JWT access tokens carrying
//! identity claims, and validates those tokens offline against the
//! process-wide public key — no server round-trip, no token store.
//!
//! Persistence ([`registry::ClientStore`], [`principal::UserStore`]) and HTTP
//! transport are external collaborators. The signing keypair is loaded once
//! at startup from a passphrase-protected keystore
//! ([`crypto::KeyMaterial::load`]) and shared immutably; a load failure is
//! fatal and the process must not accept requests.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gatekey::config::AuthConfig;
//! use gatekey::crypto::KeyMaterial;
//! use gatekey::server::AuthorizationServerCore;
//! # use gatekey::registry::ClientStore;
//! # use gatekey::principal::UserStore;
//!
//! # fn example(client_store: Arc<dyn ClientStore>, user_store: Arc<dyn UserStore>) -> anyhow::Result<()> {
//! let config = AuthConfig::from_env();
//! let keys = Arc::new(KeyMaterial::load(&config)?);
//! let core = AuthorizationServerCore::new(keys, client_store, user_store, &config);
//! # Ok(())
//! # }
//! ```

/// Environment-driven configuration
pub mod config;
/// Keystore and process-wide signing keypair
pub mod crypto;
/// Error taxonomy and RFC 6749 wire mapping
pub mod errors;
/// Client, user principal, and wire data models
pub mod models;
/// User principal resolution and account status gating
pub mod principal;
/// Client registry and credential validation
pub mod registry;
/// Orchestration core and access policies
pub mod server;
/// Token issuance, enhancement, and validation pipeline
pub mod token;

pub use config::AuthConfig;
pub use crypto::{JsonWebKey, KeyMaterial, KeyStore};
pub use errors::{AuthError, AuthResult, OAuth2ErrorResponse};
pub use models::{
    Client, GrantType, IntrospectionResponse, Permission, TokenKeyResponse, TokenRequest,
    TokenResponse, UserPrincipal,
};
pub use principal::{classify_identifier, IdentifierKind, UserPrincipalStore, UserStore};
pub use registry::{ClientRegistry, ClientStore};
pub use server::{AccessPolicy, AuthorizationServerCore, Operation};
pub use token::{enhance, AccessToken, Claims, TokenIssuer, TokenUse, TokenValidator};
