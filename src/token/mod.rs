// ABOUTME: Token pipeline: issuance, claim enhancement, and offline validation
// ABOUTME: Tokens are RS256 JWTs; validity is signature plus embedded expiry only
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Stateless token pipeline.
//!
//! Tokens are never persisted server-side: validity is determined purely by
//! signature and timestamps, so expiry is the only termination mechanism.

/// Claim-set enhancement with identity-derived information
pub mod enhancer;
/// Token building and RS256 signing
pub mod issuer;
/// Signature, expiry, and scope verification
pub mod validator;

pub use enhancer::enhance;
pub use issuer::{AccessToken, Claims, TokenIssuer, TokenUse};
pub use validator::TokenValidator;
