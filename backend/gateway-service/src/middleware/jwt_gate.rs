//! Edge authentication gate
//!
//! Signature-only verification: no user lookup, so the gate stays fast and
//! stateless. Allow-listed paths pass through untouched. On success the
//! verified `AuthContext` is attached to the request for the proxy to turn
//! into identity headers; on failure the request is rejected here and no
//! upstream is ever contacted.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use error_types::ApiError;
use futures::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use crate::routes;
use crate::GatewayState;

pub struct JwtGateMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtGateMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtGateMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtGateMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtGateMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtGateMiddlewareService<S>
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
            let path = req.path().to_string();

            if routes::is_public(&path) {
                tracing::debug!(%path, "public path, skipping authentication");
                return service.call(req).await;
            }

            let state = req
                .app_data::<web::Data<GatewayState>>()
                .cloned()
                .ok_or_else(|| ApiError::Internal("GatewayState not configured".to_string()))?;

            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| {
                    tracing::warn!(%path, "request without Authorization header rejected");
                    ApiError::MissingAuthHeader
                })?;

            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or(ApiError::MissingAuthHeader)?;

            let context = state.verifier.verify(token).map_err(|e| {
                tracing::warn!(%path, error = %e, "token rejected at the gate");
                ApiError::from(e)
            })?;

            tracing::debug!(%path, subject = %context.subject, "token verified at the gate");
            req.extensions_mut().insert(context);

            service.call(req).await
        })
    }
}
