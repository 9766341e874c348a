use serde::{Deserialize, Serialize};
use token_core::Role;
use uuid::Uuid;
use validator::Validate;

/// A registered principal. Plain data; role-derived authorities come from
/// `token_core::Capability`, not from methods on this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppUser {
    pub id: Uuid,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
}

// Request/Response DTOs. Field names are camelCase on the wire for
// compatibility with the existing frontend.

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(email(message = "Email should be valid"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
}

impl From<AppUser> for UserResponse {
    fn from(user: AppUser) -> Self {
        UserResponse {
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
            active: user.active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}
