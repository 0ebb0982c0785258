#![allow(dead_code)]

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use sanchaara_api::config::AppConfig;
use sanchaara_api::services::gemini_service::{GeminiError, GenerationRequest, TextGenerator};
use sanchaara_api::AppState;

/// Replays canned model outputs in order and records every request it receives.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, GeminiError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Result<String, GeminiError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeminiError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GeminiError::MissingApiKey))
    }
}

pub fn busy() -> Result<String, GeminiError> {
    Err(GeminiError::Status {
        status: 503,
        message: "The model is overloaded. (UNAVAILABLE)".to_string(),
    })
}

pub fn test_config(api_key: Option<&str>) -> AppConfig {
    let mut vars = HashMap::new();
    // Keep retry backoff out of the test runtime
    vars.insert("AI_INITIAL_BACKOFF_MS".to_string(), "1".to_string());
    vars.insert("RUST_ENV".to_string(), "test".to_string());
    if let Some(key) = api_key {
        vars.insert("GEMINI_API_KEY".to_string(), key.to_string());
    }
    AppConfig::from_lookup(|key| vars.get(key).cloned()).expect("test config")
}

pub struct TestApp {
    pub generator: Arc<ScriptedGenerator>,
    pub state: web::Data<AppState>,
}

impl TestApp {
    pub fn new(replies: Vec<Result<String, GeminiError>>) -> Self {
        Self::with_config(test_config(Some("test-key-123456")), replies)
    }

    pub fn with_config(config: AppConfig, replies: Vec<Result<String, GeminiError>>) -> Self {
        let generator = ScriptedGenerator::new(replies);
        let state = web::Data::new(AppState::new(config, generator.clone()));
        Self { generator, state }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(self.state.clone())
            .configure(sanchaara_api::configure)
    }
}
