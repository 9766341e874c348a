/// Internal-token issuance for service-to-service calls
use actix_web::{web, HttpRequest, HttpResponse};
use error_types::ApiError;

use crate::AppState;

/// Header carrying the pre-shared internal API key.
pub const INTERNAL_API_KEY_HEADER: &str = "Internal-Api-Key";

/// `POST /internal-auth/internal-token`
///
/// Returns the raw token string, matching what internal callers expect to
/// drop straight into an Authorization header.
pub async fn internal_token(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let api_key = req
        .headers()
        .get(INTERNAL_API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or(ApiError::InvalidApiKey)?;

    let token = state.auth.internal_token(api_key)?;
    Ok(HttpResponse::Ok().content_type("text/plain").body(token))
}
