use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::models::trip::TripForm;
use crate::services::gemini_service::{GeminiError, GenerationRequest, TextGenerator};
use crate::services::json_extract::{extract_json, ExtractError};
use crate::services::prompt_service::{destination_check_prompt, is_affirmative, itinerary_prompt};
use crate::services::retry::{generate_with_retry, RetryPolicy};

const GENERATION_TEMPERATURE: f64 = 0.4;

#[derive(Debug, Error)]
pub enum ItineraryError {
    #[error("Please enter a destination within India (e.g., Manali, Goa, Munnar, or Jaipur).")]
    MissingDestination,
    #[error("Sanchaara AI is currently optimized for Incredible India. Please enter a destination within India (e.g., Manali, Goa, Munnar, or Jaipur).")]
    OutsideIndia { destination: String },
    #[error(transparent)]
    Ai(#[from] GeminiError),
    #[error("The AI provided an invalid travel data format. Please try again. ({0})")]
    Extract(#[from] ExtractError),
}

impl ItineraryError {
    /// Caller mistakes, as opposed to failures on the AI side.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ItineraryError::MissingDestination | ItineraryError::OutsideIndia { .. }
        )
    }
}

pub struct ItineraryPlanner {
    generator: Arc<dyn TextGenerator>,
    retry_policy: RetryPolicy,
}

impl ItineraryPlanner {
    pub fn new(generator: Arc<dyn TextGenerator>, retry_policy: RetryPolicy) -> Self {
        Self {
            generator,
            retry_policy: retry_policy.retry_on_empty(),
        }
    }

    pub async fn plan(&self, form: &TripForm) -> Result<Value, ItineraryError> {
        let destination = form.destination();
        if destination.is_empty() {
            return Err(ItineraryError::MissingDestination);
        }

        log::info!("Verifying destination: {}", destination);
        if !self.is_in_india(destination).await? {
            log::info!("Rejected destination outside India: {}", destination);
            return Err(ItineraryError::OutsideIndia {
                destination: destination.to_string(),
            });
        }

        log::info!("Planning journey: {} -> {}", form.origin, destination);
        let request = GenerationRequest::prompt(itinerary_prompt(form))
            .with_temperature(GENERATION_TEMPERATURE)
            .with_json_output()
            .with_relaxed_safety();

        let text = generate_with_retry(self.generator.as_ref(), &request, &self.retry_policy).await?;
        let itinerary = extract_json(&text)?;

        log::info!("Itinerary generated for {}", destination);
        Ok(itinerary)
    }

    async fn is_in_india(&self, destination: &str) -> Result<bool, GeminiError> {
        let request = GenerationRequest::prompt(destination_check_prompt(destination));
        let answer = self.generator.generate(&request).await?;
        Ok(is_affirmative(&answer))
    }
}
