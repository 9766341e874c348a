//! Administrative user management: the minimal surface the trust layer
//! needs for activating accounts and assigning roles.

use std::sync::Arc;

use error_types::{ApiError, ApiResult};
use token_core::Role;

use crate::db::PrincipalStore;
use crate::models::UserResponse;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn PrincipalStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn PrincipalStore>) -> Self {
        UserService { store }
    }

    pub async fn list(&self) -> ApiResult<Vec<UserResponse>> {
        let users = self.store.list().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn update_role(&self, email: &str, role: Role) -> ApiResult<UserResponse> {
        let user = self
            .store
            .update_role(email, role)
            .await?
            .ok_or_else(|| ApiError::Validation(format!("no such user: {email}")))?;

        tracing::info!(%email, role = %role, "user role updated");
        Ok(user.into())
    }

    pub async fn set_active(&self, email: &str, active: bool) -> ApiResult<UserResponse> {
        let user = self
            .store
            .set_active(email, active)
            .await?
            .ok_or_else(|| ApiError::Validation(format!("no such user: {email}")))?;

        tracing::info!(%email, active, "user active flag updated");
        Ok(user.into())
    }
}
