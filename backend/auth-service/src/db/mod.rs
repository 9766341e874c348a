//! Principal persistence
//!
//! The issuer and verifier only see the `PrincipalStore` trait; the Postgres
//! implementation lives in `user_repo`, and an in-memory double in `memory`
//! backs the tests.

pub mod memory;
pub mod user_repo;

use async_trait::async_trait;
use error_types::ApiError;
use thiserror::Error;
use token_core::Role;

use crate::models::AppUser;

/// Store-level failure: the lookup itself failed, as opposed to "no such
/// user". Surfaced as `UPSTREAM_UNAVAILABLE`, never as a credentials error.
#[derive(Debug, Error)]
#[error("principal store failure: {0}")]
pub struct StoreError(pub String);

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::UpstreamUnavailable(err.to_string())
    }
}

#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<AppUser>, StoreError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError>;
    async fn save(&self, user: AppUser) -> Result<AppUser, StoreError>;
    async fn update_role(&self, email: &str, role: Role) -> Result<Option<AppUser>, StoreError>;
    async fn set_active(&self, email: &str, active: bool) -> Result<Option<AppUser>, StoreError>;
    async fn list(&self) -> Result<Vec<AppUser>, StoreError>;
}
