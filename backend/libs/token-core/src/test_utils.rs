//! Helpers for crafting tokens with explicit claims in tests
//!
//! Lets tests control `iat`/`exp` directly (e.g. to simulate a clock moved
//! 25 hours forward) without widening the production issuer API.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::Claims;

/// Sign arbitrary claims with `secret`. Panics on failure; test-only code.
pub fn sign_claims(secret: &str, claims: &Claims) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to sign test claims")
}
