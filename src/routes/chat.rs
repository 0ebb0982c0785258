use actix_web::{error::InternalError, web, HttpResponse, Responder};

use crate::models::chat::{ChatReply, ChatRequest};
use crate::services::chat_service::{self, FALLBACK_REPLY};
use crate::AppState;

/*
    /api/chat
    Always answers 200; AI failures turn into a friendly retry hint.
*/
pub async fn chat(state: web::Data<AppState>, input: web::Json<ChatRequest>) -> impl Responder {
    let reply = match chat_service::reply(state.generator.as_ref(), input.into_inner()).await {
        Ok(text) => {
            log::info!("Chat response sent");
            text
        }
        Err(err) => {
            log::error!("Chatbot error: {}", err);
            FALLBACK_REPLY.to_string()
        }
    };

    HttpResponse::Ok().json(ChatReply { reply })
}

/// Unreadable chat bodies still get the fallback reply instead of a 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("Unreadable chat request: {}", err);
        let body = ChatReply {
            reply: FALLBACK_REPLY.to_string(),
        };
        InternalError::from_response(err, HttpResponse::Ok().json(body)).into()
    })
}
