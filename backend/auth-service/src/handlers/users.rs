/// Administrative user management handlers. All require ROLE_ADMIN,
/// enforced against the request's verified capability set.
use actix_web::{web, HttpResponse};
use error_types::ApiError;
use token_core::Capability;

use crate::middleware::AuthenticatedUser;
use crate::models::{SetActiveRequest, UpdateRoleRequest};
use crate::AppState;

/// `GET /api/users`
pub async fn list_users(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    user.require(&Capability::admin())?;

    let users = state.users.list().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// `PUT /api/users/{email}/role`
pub async fn update_role(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateRoleRequest>,
) -> Result<HttpResponse, ApiError> {
    user.require(&Capability::admin())?;

    let updated = state.users.update_role(&path, payload.role).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// `PUT /api/users/{email}/active`
pub async fn set_active(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<SetActiveRequest>,
) -> Result<HttpResponse, ApiError> {
    user.require(&Capability::admin())?;

    let updated = state.users.set_active(&path, payload.active).await?;
    Ok(HttpResponse::Ok().json(updated))
}
