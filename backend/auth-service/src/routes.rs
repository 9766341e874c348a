use actix_web::{web, HttpResponse};

use crate::handlers::{auth, internal, users};
use crate::middleware::JwtAuthMiddleware;

/// Route table. `/api/auth` and `/internal-auth` are public (the gateway
/// allow-lists them too); `/api/users` sits behind the subject-lookup
/// verification middleware.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login)),
    )
    .service(
        web::scope("/internal-auth")
            .route("/internal-token", web::post().to(internal::internal_token)),
    )
    .service(
        web::scope("/api/users")
            .wrap(JwtAuthMiddleware)
            .route("", web::get().to(users::list_users))
            .route("/{email}/role", web::put().to(users::update_role))
            .route("/{email}/active", web::put().to(users::set_active)),
    )
    .route("/health", web::get().to(health));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}
