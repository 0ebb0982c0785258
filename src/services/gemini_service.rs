//! Client for the Gemini `generateContent` endpoint.
//!
//! Handlers depend on [`TextGenerator`]; [`GeminiService`] is the HTTP implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GeminiConfig;
use crate::models::chat::{ChatRole, ChatTurn};

const HARM_CATEGORIES_RELAXED: [&str; 2] = ["HARM_CATEGORY_HARASSMENT", "HARM_CATEGORY_HATE_SPEECH"];

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gemini returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Prompt was blocked: {0}")]
    Blocked(String),
    #[error("AI returned empty content")]
    EmptyResponse,
    #[error("Failed to parse Gemini response: {0}")]
    Decode(String),
}

impl GeminiError {
    /// 429, 503, or an upstream message reporting an overloaded model.
    pub fn is_retryable(&self) -> bool {
        match self {
            GeminiError::Status { status, message } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16()
                    || *status == StatusCode::SERVICE_UNAVAILABLE.as_u16()
                    || message.to_lowercase().contains("overloaded")
            }
            _ => false,
        }
    }
}

/// Provider-neutral description of one completion call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    /// Overrides the configured model for this call.
    pub model: Option<String>,
    pub system_instruction: Option<String>,
    pub turns: Vec<ChatTurn>,
    pub temperature: Option<f64>,
    pub json_output: bool,
    pub relaxed_safety: bool,
}

impl GenerationRequest {
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            turns: vec![ChatTurn::new(ChatRole::User, text)],
            ..Default::default()
        }
    }

    pub fn conversation(history: Vec<ChatTurn>, message: impl Into<String>) -> Self {
        let mut turns = history;
        turns.push(ChatTurn::new(ChatRole::User, message));
        Self {
            turns,
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }

    pub fn with_relaxed_safety(mut self) -> Self {
        self.relaxed_safety = true;
        self
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeminiError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentBody {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(rename = "safetySettings", skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl From<&GenerationRequest> for GenerateContentBody {
    fn from(request: &GenerationRequest) -> Self {
        let contents = request
            .turns
            .iter()
            .map(|turn| Content {
                role: Some(
                    match turn.role {
                        ChatRole::User => "user",
                        ChatRole::Model => "model",
                    }
                    .to_string(),
                ),
                parts: turn
                    .parts
                    .iter()
                    .map(|part| Part {
                        text: Some(part.text.clone()),
                    })
                    .collect(),
            })
            .collect();

        let system_instruction = request.system_instruction.as_ref().map(|text| Content {
            role: None,
            parts: vec![Part {
                text: Some(text.clone()),
            }],
        });

        let generation_config = if request.temperature.is_some() || request.json_output {
            Some(GenerationConfig {
                temperature: request.temperature,
                response_mime_type: request.json_output.then(|| "application/json".to_string()),
            })
        } else {
            None
        };

        let safety_settings = if request.relaxed_safety {
            HARM_CATEGORIES_RELAXED
                .iter()
                .map(|category| SafetySetting {
                    category: category.to_string(),
                    threshold: "BLOCK_NONE".to_string(),
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            contents,
            system_instruction,
            generation_config,
            safety_settings,
        }
    }
}

#[derive(Clone)]
pub struct GeminiService {
    client: Client,
    config: GeminiConfig,
}

impl GeminiService {
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.as_str().trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiService {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeminiError> {
        let api_key = self.config.api_key.as_deref().ok_or(GeminiError::MissingApiKey)?;
        let model = request.model.as_deref().unwrap_or(&self.config.model);
        let body = GenerateContentBody::from(request);

        log::debug!("Calling {} with {} turn(s)", model, body.contents.len());

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(GeminiError::Status {
                status: status.as_u16(),
                message: upstream_message(&raw),
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::Decode(e.to_string()))?;

        if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GeminiError::Blocked(reason));
        }

        let text = candidate_text(parsed.candidates);
        if text.trim().is_empty() {
            return Err(GeminiError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Google wraps failures as `{"error": {"message": ..., "status": ...}}`; fall back to the raw body.
fn upstream_message(raw: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(raw) {
        Ok(envelope) => match envelope.error.status {
            Some(status) if !envelope.error.message.is_empty() => {
                format!("{} ({})", envelope.error.message, status)
            }
            Some(status) => status,
            None => envelope.error.message,
        },
        Err(_) if raw.trim().is_empty() => "Unknown error".to_string(),
        Err(_) => raw.trim().to_string(),
    }
}

fn candidate_text(candidates: Vec<Candidate>) -> String {
    candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn retryable_statuses() {
        let busy = GeminiError::Status {
            status: 503,
            message: "UNAVAILABLE".to_string(),
        };
        let quota = GeminiError::Status {
            status: 429,
            message: "RESOURCE_EXHAUSTED".to_string(),
        };
        let overloaded = GeminiError::Status {
            status: 500,
            message: "The model is overloaded. Please try again later.".to_string(),
        };
        let bad_request = GeminiError::Status {
            status: 400,
            message: "API key not valid".to_string(),
        };

        assert!(busy.is_retryable());
        assert!(quota.is_retryable());
        assert!(overloaded.is_retryable());
        assert!(!bad_request.is_retryable());
        assert!(!GeminiError::MissingApiKey.is_retryable());
        assert!(!GeminiError::Blocked("SAFETY".to_string()).is_retryable());
    }

    #[test]
    fn body_for_json_generation() {
        let request = GenerationRequest::prompt("plan a trip")
            .with_temperature(0.4)
            .with_json_output()
            .with_relaxed_safety();
        let body = serde_json::to_value(GenerateContentBody::from(&request)).unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [{ "role": "user", "parts": [{ "text": "plan a trip" }] }],
                "generationConfig": { "temperature": 0.4, "responseMimeType": "application/json" },
                "safetySettings": [
                    { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_NONE" },
                    { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_NONE" }
                ]
            })
        );
    }

    #[test]
    fn body_for_conversation_keeps_turn_order() {
        let history = vec![
            ChatTurn::new(ChatRole::User, "hi"),
            ChatTurn::new(ChatRole::Model, "hello"),
        ];
        let request = GenerationRequest::conversation(history, "best time for Goa?")
            .with_system_instruction("be brief");
        let body = serde_json::to_value(GenerateContentBody::from(&request)).unwrap();

        assert_eq!(body["systemInstruction"], json!({ "parts": [{ "text": "be brief" }] }));
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2]["parts"][0]["text"], "best time for Goa?");
        assert!(body.get("generationConfig").is_none());
        assert!(body.get("safetySettings").is_none());
    }

    #[test]
    fn upstream_message_prefers_error_envelope() {
        let raw = r#"{"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#;
        assert_eq!(upstream_message(raw), "The model is overloaded. (UNAVAILABLE)");
        assert_eq!(upstream_message("gateway timeout"), "gateway timeout");
        assert_eq!(upstream_message(""), "Unknown error");
    }

    #[test]
    fn candidate_text_joins_parts() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        }))
        .unwrap();
        assert_eq!(candidate_text(parsed.candidates), "{\"a\":1}");
        assert_eq!(candidate_text(Vec::new()), "");
    }
}
