use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use unicorn_bridge_core::init_bridge_core;
use unicorn_relay::api::configure;
use unicorn_relay::app::state::AppState;
use unicorn_relay::infrastructure::config::RelayConfig;
use unicorn_relay::infrastructure::logger::{LogConfig, Logger};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = match RelayConfig::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load relay configuration: {e}");
            return Err(std::io::Error::other(format!("Configuration initialization failed: {e}")));
        }
    };
    let _log_guard = Logger::init(&LogConfig::from(&config));

    tracing::info!("Starting Unicorn relay...");

    let problems = config.validate();
    if !problems.is_empty() {
        tracing::error!("Configuration validation failed: {}", problems.join(", "));
        return Err(std::io::Error::other(format!(
            "Configuration validation failed: {}",
            problems.join(", ")
        )));
    }
    tracing::info!(config = %config.summary(), "Relay configuration loaded");

    let core = match init_bridge_core().await {
        Ok(core) => core,
        Err(e) => {
            tracing::error!("Failed to initialize bridge core: {}", e);
            return Err(std::io::Error::other(format!("Bridge core initialization failed: {e}")));
        }
    };
    tracing::info!(config = %core.config.summary(), "Bridge core initialized");

    if config.auto_connect {
        match core.session.auto_connect().await {
            Ok(account) => tracing::info!(account = %account, "Wallet auto-connected"),
            Err(e) => tracing::warn!("Auto-connect skipped: {}", e.user_message()),
        }
    }

    let state = web::Data::new(AppState::from_core(&core));

    tracing::info!("Listening on {}:{}", config.host, config.port);
    tracing::info!("Environment: {}", config.environment);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(actix_cors::Cors::permissive())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
