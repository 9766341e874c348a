//! Signature-plus-subject-lookup verification middleware
//!
//! The gateway already checks signatures, but for the auth service's own
//! role-protected routes the bearer token is additionally resolved against
//! live user state. A deactivated account is rejected here even while its
//! unexpired token still passes the gateway's signature-only check; the two
//! strategies coexist on purpose.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use error_types::ApiError;
use futures::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use token_core::{AuthContext, Capability};

use crate::AppState;

/// Identity attached to the request after full verification.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub context: AuthContext,
}

impl AuthenticatedUser {
    pub fn email(&self) -> &str {
        &self.context.subject
    }

    /// Capability gate for handlers: 403 unless the context holds `required`.
    pub fn require(&self, required: &Capability) -> Result<(), ApiError> {
        if self.context.has_capability(required) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

impl actix_web::FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(ApiError::MissingAuthHeader.into())),
        }
    }
}

/// Middleware factory; wrap protected scopes with it.
pub struct JwtAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .cloned()
                .ok_or_else(|| ApiError::Internal("AppState not configured".to_string()))?;

            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .ok_or(ApiError::MissingAuthHeader)?;

            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or(ApiError::MissingAuthHeader)?;

            let context = state.verifier.verify(token).map_err(ApiError::from)?;

            // Subject must resolve to a live principal: this is what rejects
            // a deactivated account holding a still-valid token.
            let user = state
                .store
                .find_by_email(&context.subject)
                .await
                .map_err(ApiError::from)?
                .ok_or(ApiError::UnknownSubject)?;

            if !user.active {
                tracing::warn!(subject = %context.subject, "token for disabled account rejected");
                return Err(ApiError::DisabledAccount.into());
            }

            req.extensions_mut().insert(AuthenticatedUser { context });

            service.call(req).await
        })
    }
}
