/// GlucoTrack Auth Service - Main entry point
use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use auth_service::{
    config::Config,
    db::user_repo::PgPrincipalStore,
    routes,
    services::{auth_service::AuthService, user_service::UserService},
    AppState,
};
use token_core::{TokenIssuer, TokenVerifier};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        "Starting auth service on {}:{}",
        config.server_host,
        config.server_port
    );

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(std::time::Duration::from_secs(3))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Database connection pool initialized");

    // Empty signing key is fatal here, before the server binds.
    let issuer = TokenIssuer::new(&config.jwt_secret_key)?;
    let verifier = TokenVerifier::new(&config.jwt_secret_key)?;

    let store: Arc<dyn auth_service::db::PrincipalStore> =
        Arc::new(PgPrincipalStore::new(pool));

    let state = AppState {
        auth: AuthService::new(store.clone(), issuer, config.internal_api_key.clone()),
        users: UserService::new(store.clone()),
        verifier,
        store,
    };

    let bind_addr = (config.server_host.clone(), config.server_port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
