use std::sync::Arc;

use actix_web::{error::InternalError, web, HttpResponse};

pub mod config;
pub mod models;
pub mod routes;
pub mod services;

use config::AppConfig;
use models::error::ErrorBody;
use services::gemini_service::TextGenerator;
use services::itinerary_service::ItineraryPlanner;
use services::retry::RetryPolicy;

pub struct AppState {
    pub config: AppConfig,
    pub generator: Arc<dyn TextGenerator>,
    pub planner: ItineraryPlanner,
}

impl AppState {
    pub fn new(config: AppConfig, generator: Arc<dyn TextGenerator>) -> Self {
        let planner = ItineraryPlanner::new(generator.clone(), RetryPolicy::from_config(&config.retry));
        Self {
            config,
            generator,
            planner,
        }
    }
}

/// Route table shared by the server binary and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/", web::get().to(|| async { "Sanchaara API is running" }))
        .route("/health", web::get().to(routes::health::health_check))
        .service(
            web::scope("/api")
                .route(
                    "/generate-itinerary",
                    web::post().to(routes::itinerary::generate_itinerary),
                )
                .service(
                    web::resource("/chat")
                        .app_data(routes::chat::json_config())
                        .route(web::post().to(routes::chat::chat)),
                ),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = ErrorBody::new("Invalid request body").with_details(err.to_string());
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}
