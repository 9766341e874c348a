//! GlucoTrack Gateway Service
//!
//! The platform's edge: every inbound request is authenticated here before
//! it reaches a downstream service. Valid bearer tokens are verified
//! signature-only (no user lookup), then the verified identity is injected
//! as `X-auth-email` / `X-auth-role` headers on the forwarded request so
//! downstream services can authorize locally. Rejection at the gate is
//! terminal; no upstream is contacted.

pub mod config;
pub mod middleware;
pub mod proxy;
pub mod routes;

use token_core::TokenVerifier;

use crate::routes::RouteTable;

/// Shared gateway state; immutable after startup.
#[derive(Clone)]
pub struct GatewayState {
    pub verifier: TokenVerifier,
    pub http: reqwest::Client,
    pub routes: RouteTable,
}
