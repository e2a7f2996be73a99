// ABOUTME: Cryptographic key handling for the authorization server core
// ABOUTME: Passphrase-protected keystore plus the process-wide signing keypair
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

/// Process-wide RSA signing keypair loaded once at startup
pub mod keys;
/// Encrypted on-disk container for private key material
pub mod keystore;

pub use keys::{JsonWebKey, KeyMaterial};
pub use keystore::KeyStore;
