pub mod chat_service;
pub mod gemini_service;
pub mod itinerary_service;
pub mod json_extract;
pub mod prompt_service;
pub mod retry;
