/// Authentication handlers
use actix_web::{web, HttpResponse};
use error_types::ApiError;
use validator::Validate;

use crate::models::{LoginRequest, RegisterRequest};
use crate::AppState;

/// `POST /api/auth/register`
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let response = state.auth.register(payload).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// `POST /api/auth/login`
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let response = state.auth.login(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
