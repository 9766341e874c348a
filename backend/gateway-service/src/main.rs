/// GlucoTrack Gateway Service - Main entry point
use actix_web::{web, App, HttpServer};
use tracing_subscriber::EnvFilter;

use gateway_service::{
    config::Config, middleware::JwtGateMiddleware, proxy, routes::RouteTable, GatewayState,
};
use token_core::TokenVerifier;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        "Starting gateway on {}:{}",
        config.server_host,
        config.server_port
    );

    // Empty signing key is fatal before the server binds.
    let verifier = TokenVerifier::new(&config.jwt_secret_key)?;

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.upstream_timeout_secs))
        .build()?;

    let state = GatewayState {
        verifier,
        http,
        routes: RouteTable::new(
            config.auth_service_url.clone(),
            config.patient_service_url.clone(),
            config.note_service_url.clone(),
        ),
    };

    let bind_addr = (config.server_host.clone(), config.server_port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(JwtGateMiddleware)
            .route("/health", web::get().to(proxy::health))
            .default_service(web::route().to(proxy::forward))
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
