//! Main entry point for the CTR service.
//! Sets up the HTTP server, configures logging, and initializes the services with
//! environment-based configuration.

use actix_web::{middleware, web, App, HttpServer};

use ctr::{api, AppConfig, AppState};

/// Main entry point for the CTR service.
///
/// # Server Configuration
/// - Binds to CTR_BIND_ADDRESS:CTR_PORT (default 0.0.0.0:8080)
/// - Seeds the admin account before accepting requests
/// - Every resource endpoint requires basic authentication
///
/// # Error Handling
/// - Invalid configuration aborts startup with a logged error
/// - Returns std::io::Error for server startup issues
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Log level can be set via RUST_LOG environment variable
    env_logger::init();

    log::info!("Starting CTR service...");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };
    log::info!(
        "Directions host: {}, failure policy: {:?}, max concurrent lookups: {}",
        config.google_host,
        config.nearby_failure_policy,
        config.max_concurrent_lookups
    );

    let state = AppState::from_config(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    state
        .seed_admin(&config)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let state = web::Data::new(state);

    log::info!("Starting server on {}:{}", config.bind_address, config.port);

    let bind = (config.bind_address.clone(), config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone()) // Share services across workers
            .wrap(api::cors(&config))
            .wrap(middleware::Logger::default())
            .configure(api::configure)
    })
    .bind(bind)?
    .run()
    .await
}
