use thiserror::Error;

use crate::models::chat::{ChatRequest, ChatRole, ChatTurn};
use crate::services::gemini_service::{GeminiError, GenerationRequest, TextGenerator};
use crate::services::prompt_service::chat_system_instruction;

pub const FALLBACK_REPLY: &str =
    "I'm experiencing high traffic from other travelers. Please ask me again in a few seconds! 🇮🇳";

/// Gemini requires history to alternate starting with `user`, and the new message is
/// appended as a `user` turn, so history may not end on one either.
pub fn sanitize_history(history: Vec<ChatTurn>) -> Vec<ChatTurn> {
    let mut clean: Vec<ChatTurn> = history
        .into_iter()
        .filter(|turn| turn.first_text().is_some_and(|text| !text.trim().is_empty()))
        .collect();

    if clean.first().is_some_and(|turn| turn.role == ChatRole::Model) {
        clean.remove(0);
    }
    if clean.last().is_some_and(|turn| turn.role == ChatRole::User) {
        clean.pop();
    }
    clean
}

pub fn build_chat_request(request: ChatRequest) -> GenerationRequest {
    let system_instruction = chat_system_instruction(request.itinerary_context.as_ref());
    let history = sanitize_history(request.history.unwrap_or_default());
    GenerationRequest::conversation(history, request.message).with_system_instruction(system_instruction)
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Chat message is empty")]
    EmptyMessage,
    #[error(transparent)]
    Ai(#[from] GeminiError),
}

/// Single attempt; blank model output is an error so callers never forward an empty reply.
pub async fn reply(generator: &dyn TextGenerator, request: ChatRequest) -> Result<String, ChatError> {
    if request.message.trim().is_empty() {
        return Err(ChatError::EmptyMessage);
    }

    let generation = build_chat_request(request);
    let text = generator.generate(&generation).await?;
    if text.trim().is_empty() {
        return Err(GeminiError::EmptyResponse.into());
    }
    Ok(text)
}
