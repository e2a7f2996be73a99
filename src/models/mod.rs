// ABOUTME: Data model module for clients, user principals, and wire types
// ABOUTME: Read-only views of persisted records plus RFC 6749 request/response shapes
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Data models consumed and produced by the authorization core.
//!
//! `Client` and `UserPrincipal` are point-in-time views of records owned by
//! the external persistence layer; this core never writes them.

/// Registered OAuth client records and grant types
pub mod client;
/// User principal and permission records
pub mod user;
/// Request/response shapes for the token, token-key, and check-token operations
pub mod wire;

pub use client::{Client, GrantType};
pub use user::{Permission, UserPrincipal};
pub use wire::{IntrospectionResponse, TokenKeyResponse, TokenRequest, TokenResponse};
