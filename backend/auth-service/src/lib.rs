//! GlucoTrack Auth Service
//!
//! Credential issuer for the platform: registers and logs in users, mints
//! their signed tokens, exchanges the internal API key for service-to-service
//! tokens, and re-verifies bearer tokens against live user state for its own
//! role-protected routes.

pub mod config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;

use std::sync::Arc;

use token_core::TokenVerifier;

use crate::db::PrincipalStore;
use crate::services::auth_service::AuthService;
use crate::services::user_service::UserService;

/// Shared application state; immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub users: UserService,
    pub verifier: TokenVerifier,
    pub store: Arc<dyn PrincipalStore>,
}
