//! Token codec for the GlucoTrack identity layer
//!
//! Issues and verifies the compact HMAC-SHA256 credentials every service in
//! the platform agrees on: claims `sub`, `roles`, `iat`, `exp = iat + 24h`,
//! signed with the single process-wide secret. Tokens are inert data — no
//! issued-token state is kept anywhere, so any process configured with the
//! same secret can verify tokens minted by any other.
//!
//! Verification here is signature-only. The auth service layers a live
//! subject lookup on top of this for its own routes; see the service's
//! middleware.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod roles;
pub mod test_utils;

pub use roles::{map_role_claims, AuthContext, Capability, Role, RoleClaim};

use error_types::ApiError;

/// Fixed credential lifetime: 24 hours.
pub const TOKEN_TTL_SECS: i64 = 86_400;

/// Synthetic subject for service-to-service tokens.
pub const INTERNAL_SUBJECT: &str = "internal-service";

/// Wire claims. `roles` is issued as an array; the legacy single-string
/// shape is still accepted on decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<RoleClaim>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Standard claims for `subject` carrying one role, valid for 24 hours
    /// from `issued_at`.
    pub fn new(subject: &str, role: Role, issued_at: i64) -> Self {
        Claims {
            sub: subject.to_string(),
            roles: Some(RoleClaim::Many(vec![role.as_str().to_string()])),
            iat: issued_at,
            exp: issued_at + TOKEN_TTL_SECS,
        }
    }
}

/// Verification failures, in the order the checks run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed => ApiError::Malformed,
            TokenError::InvalidSignature => ApiError::InvalidSignature,
            TokenError::Expired => ApiError::Expired,
        }
    }
}

/// The signing key was missing or empty at startup.
#[derive(Debug, Error)]
#[error("JWT signing key must not be empty")]
pub struct EmptySigningKey;

/// Token could not be signed. Practically unreachable with an HMAC key;
/// surfaced rather than panicking on the request path.
#[derive(Debug, Error)]
#[error("token signing failed")]
pub struct IssueError(#[source] jsonwebtoken::errors::Error);

impl From<IssueError> for ApiError {
    fn from(err: IssueError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Mints signed credentials. Pure function of its inputs and the process
/// signing key; no side effects, no issued-token record.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Result<Self, EmptySigningKey> {
        if secret.trim().is_empty() {
            return Err(EmptySigningKey);
        }
        Ok(TokenIssuer {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Token for a human principal: `sub` = email, one role.
    pub fn issue_user_token(&self, email: &str, role: Role) -> Result<String, IssueError> {
        self.sign(&Claims::new(email, role, Utc::now().timestamp()))
    }

    /// Token for an internal caller: fixed synthetic subject, fixed role.
    pub fn issue_internal_token(&self) -> Result<String, IssueError> {
        self.sign(&Claims::new(
            INTERNAL_SUBJECT,
            Role::InternalService,
            Utc::now().timestamp(),
        ))
    }

    fn sign(&self, claims: &Claims) -> Result<String, IssueError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(IssueError)
    }
}

/// Signature-only verification: no data-store lookup, usable by the gateway
/// and any stateless resource server.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Result<Self, EmptySigningKey> {
        if secret.trim().is_empty() {
            return Err(EmptySigningKey);
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Ok(TokenVerifier {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Validates signature and expiry, then maps the role claim into the
    /// per-request `AuthContext`.
    pub fn verify(&self, token: &str) -> Result<AuthContext, TokenError> {
        let data =
            decode::<Claims>(token, &self.decoding, &self.validation).map_err(classify_error)?;

        let capabilities = map_role_claims(data.claims.roles.as_ref());
        Ok(AuthContext {
            subject: data.claims.sub,
            capabilities,
        })
    }
}

fn classify_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-signing-secret-0123456789";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SECRET).unwrap()
    }

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(SECRET).unwrap()
    }

    #[test]
    fn empty_secret_is_a_startup_error() {
        assert!(TokenIssuer::new("").is_err());
        assert!(TokenIssuer::new("   ").is_err());
        assert!(TokenVerifier::new("").is_err());
    }

    #[test]
    fn user_token_round_trip() {
        let token = issuer().issue_user_token("a@x.com", Role::User).unwrap();
        let ctx = verifier().verify(&token).unwrap();

        assert_eq!(ctx.subject, "a@x.com");
        assert_eq!(ctx.capabilities.len(), 1);
        assert!(ctx.has_capability(&Capability::from_role("USER")));
        assert_eq!(ctx.primary_role(), Some("USER"));
    }

    #[test]
    fn internal_token_round_trip() {
        let token = issuer().issue_internal_token().unwrap();
        let ctx = verifier().verify(&token).unwrap();

        assert_eq!(ctx.subject, INTERNAL_SUBJECT);
        assert!(ctx.has_capability(&Capability::internal_service()));
    }

    #[test]
    fn expiry_is_issued_at_plus_24h() {
        let claims = Claims::new("a@x.com", Role::User, 1_700_000_000);
        assert_eq!(claims.exp, 1_700_000_000 + 86_400);
    }

    #[test]
    fn expired_token_fails_with_expired() {
        // Valid signature, exp 25 hours in the past relative to iat "now - 49h".
        let issued_at = Utc::now().timestamp() - 49 * 3600;
        let token = test_utils::sign_claims(SECRET, &Claims::new("a@x.com", Role::User, issued_at));

        assert_eq!(verifier().verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(verifier().verify(""), Err(TokenError::Malformed));
        assert_eq!(verifier().verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(verifier().verify("a.b"), Err(TokenError::Malformed));
    }

    #[test]
    fn tampered_signature_is_invalid() {
        let token = issuer().issue_user_token("a@x.com", Role::User).unwrap();

        // Flip the last character of the signature segment.
        let mut bytes = token.into_bytes();
        let last = *bytes.last().unwrap();
        *bytes.last_mut().unwrap() = if last == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(
            verifier().verify(&tampered),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn token_signed_with_other_key_is_invalid() {
        let other = TokenIssuer::new("a-completely-different-secret").unwrap();
        let token = other.issue_user_token("a@x.com", Role::User).unwrap();

        assert_eq!(verifier().verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn token_without_roles_claim_verifies_with_empty_capabilities() {
        let claims = Claims {
            sub: "a@x.com".to_string(),
            roles: None,
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 600,
        };
        let token = test_utils::sign_claims(SECRET, &claims);

        let ctx = verifier().verify(&token).unwrap();
        assert!(ctx.capabilities.is_empty());
        assert_eq!(ctx.primary_role(), None);
    }

    #[test]
    fn legacy_single_string_roles_claim_is_accepted() {
        let claims = Claims {
            sub: "a@x.com".to_string(),
            roles: Some(RoleClaim::One("ADMIN".to_string())),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 600,
        };
        let token = test_utils::sign_claims(SECRET, &claims);

        let ctx = verifier().verify(&token).unwrap();
        assert!(ctx.has_capability(&Capability::admin()));
    }
}
