//! Request forwarding
//!
//! Resolves the upstream by path prefix and replays the request with the
//! verified identity injected as `X-auth-email` / `X-auth-role`. The
//! inbound request object is never mutated; the outbound request is built
//! fresh from a copy of its parts.

use actix_web::http::StatusCode;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use error_types::{ApiError, ErrorBody};
use token_core::AuthContext;

use crate::GatewayState;

/// Identity headers injected on forwarded requests.
pub const AUTH_EMAIL_HEADER: &str = "X-auth-email";
pub const AUTH_ROLE_HEADER: &str = "X-auth-role";

/// Connection-scoped headers that must not be replayed either way.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Client-supplied identity headers are dropped before injection so a
/// caller cannot impersonate by setting `X-auth-*` itself.
fn is_identity_header(name: &str) -> bool {
    name.eq_ignore_ascii_case(AUTH_EMAIL_HEADER) || name.eq_ignore_ascii_case(AUTH_ROLE_HEADER)
}

/// Default handler: everything not answered locally is forwarded upstream.
pub async fn forward(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<GatewayState>,
) -> Result<HttpResponse, ApiError> {
    let path = req.uri().path();

    let Some(upstream) = state.routes.upstream_for(path) else {
        tracing::warn!(%path, "no upstream route");
        return Ok(HttpResponse::NotFound().json(ErrorBody {
            error: "UNKNOWN_ROUTE".to_string(),
            details: format!("no upstream configured for {path}"),
        }));
    };

    let mut url = format!("{upstream}{path}");
    if let Some(query) = req.uri().query() {
        url.push('?');
        url.push_str(query);
    }

    let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
        .map_err(|e| ApiError::Internal(format!("unforwardable method: {e}")))?;

    let mut outbound = state.http.request(method, &url);

    for (name, value) in req.headers() {
        if is_hop_by_hop(name.as_str()) || is_identity_header(name.as_str()) {
            continue;
        }
        outbound = outbound.header(name.as_str(), value.as_bytes());
    }

    // Present only when the gate verified a token (public paths carry none).
    if let Some(context) = req.extensions().get::<AuthContext>() {
        outbound = outbound.header(AUTH_EMAIL_HEADER, context.subject.as_str());
        if let Some(role) = context.primary_role() {
            outbound = outbound.header(AUTH_ROLE_HEADER, role);
        }
    }

    let upstream_response = outbound
        .body(body.to_vec())
        .send()
        .await
        .map_err(|e| ApiError::UpstreamUnavailable(format!("{url}: {e}")))?;

    let status = StatusCode::from_u16(upstream_response.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = HttpResponse::build(status);
    for (name, value) in upstream_response.headers() {
        if !is_hop_by_hop(name.as_str()) {
            response.insert_header((name.as_str(), value.as_bytes()));
        }
    }

    let bytes = upstream_response
        .bytes()
        .await
        .map_err(|e| ApiError::UpstreamUnavailable(format!("{url}: {e}")))?;

    Ok(response.body(bytes))
}

/// The gateway's own liveness probe, answered locally.
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}
