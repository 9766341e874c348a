//! Registration, login, and internal-token issuance.

use std::sync::Arc;

use error_types::{ApiError, ApiResult};
use token_core::{Role, TokenIssuer};
use uuid::Uuid;

use crate::db::PrincipalStore;
use crate::models::{AppUser, AuthResponse, LoginRequest, RegisterRequest};
use crate::security::password;

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn PrincipalStore>,
    issuer: TokenIssuer,
    internal_api_key: String,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn PrincipalStore>,
        issuer: TokenIssuer,
        internal_api_key: String,
    ) -> Self {
        AuthService {
            store,
            issuer,
            internal_api_key,
        }
    }

    /// Create a principal with role PENDING and return its first token.
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<AuthResponse> {
        if self.store.exists_by_email(&request.email).await? {
            return Err(ApiError::DuplicateIdentity);
        }

        let user = AppUser {
            id: Uuid::new_v4(),
            last_name: request.last_name,
            first_name: request.first_name,
            email: request.email,
            password_hash: password::hash_password(&request.password)?,
            role: Role::Pending,
            active: true,
        };

        let saved = self.store.save(user).await?;
        tracing::info!(email = %saved.email, "user registered");

        self.issue_for(&saved)
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    /// The active flag is checked only after the password matches, so a
    /// probe cannot learn that a disabled account exists.
    pub async fn login(&self, request: LoginRequest) -> ApiResult<AuthResponse> {
        let user = self
            .store
            .find_by_email(&request.email)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        password::verify_password(&request.password, &user.password_hash)
            .map_err(|_| ApiError::InvalidCredentials)?;

        if !user.active {
            tracing::warn!(email = %user.email, "login attempt on disabled account");
            return Err(ApiError::DisabledAccount);
        }

        tracing::info!(email = %user.email, "user logged in");
        self.issue_for(&user)
    }

    /// Exchange the pre-shared API key for a fresh INTERNAL_SERVICE token.
    /// Comparison is byte-exact: no trimming, no case folding.
    pub fn internal_token(&self, api_key: &str) -> ApiResult<String> {
        if api_key != self.internal_api_key {
            tracing::warn!("internal token request with invalid API key");
            return Err(ApiError::InvalidApiKey);
        }

        Ok(self.issuer.issue_internal_token()?)
    }

    fn issue_for(&self, user: &AppUser) -> ApiResult<AuthResponse> {
        let token = self.issuer.issue_user_token(&user.email, user.role)?;

        Ok(AuthResponse {
            token,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role,
        })
    }
}
