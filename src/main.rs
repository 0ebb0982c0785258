use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use sanchaara_api::config::AppConfig;
use sanchaara_api::services::gemini_service::GeminiService;
use sanchaara_api::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    log::info!("Application starting...");

    let config = AppConfig::from_env().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    log::info!(
        "Key Status: {}",
        if config.gemini.api_key.is_some() {
            "CONFIGURED"
        } else {
            "MISSING"
        }
    );

    let gemini = GeminiService::new(config.gemini.clone()).map_err(std::io::Error::other)?;
    log::info!("Using model {}", gemini.model());

    let host = config.host.clone();
    let port = config.port;
    let state = web::Data::new(AppState::new(config, Arc::new(gemini)));

    log::info!("Sanchaara server starting on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(sanchaara_api::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
