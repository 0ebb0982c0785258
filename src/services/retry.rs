use std::time::Duration;

use tokio::time::sleep;

use crate::config::RetryConfig;
use crate::services::gemini_service::{GeminiError, GenerationRequest, TextGenerator};

const BACKOFF_MULTIPLIER: u32 = 2;

/// Exponential backoff without jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    /// Whitespace-only output counts as a retryable failure.
    pub retry_on_empty: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(2000),
            retry_on_empty: false,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_delay: config.initial_backoff,
            retry_on_empty: false,
        }
    }

    pub fn retry_on_empty(mut self) -> Self {
        self.retry_on_empty = true;
        self
    }

    /// Delay after the given zero-based attempt fails. Saturates at `Duration::MAX`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay
            .checked_mul(BACKOFF_MULTIPLIER.saturating_pow(attempt))
            .unwrap_or(Duration::MAX)
    }
}

pub async fn generate_with_retry(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
    policy: &RetryPolicy,
) -> Result<String, GeminiError> {
    let mut attempt = 0;
    loop {
        let error = match generator.generate(request).await {
            Ok(text) if policy.retry_on_empty && text.trim().is_empty() => GeminiError::EmptyResponse,
            Ok(text) => return Ok(text),
            Err(e) => e,
        };

        let retryable = error.is_retryable() || matches!(error, GeminiError::EmptyResponse);
        if !retryable || attempt + 1 >= policy.max_attempts {
            return Err(error);
        }

        let delay = policy.delay_for(attempt);
        log::warn!(
            "AI busy or quota reached ({}). Retrying in {}ms... (Attempt {}/{})",
            error,
            delay.as_millis(),
            attempt + 1,
            policy.max_attempts
        );
        sleep(delay).await;
        attempt += 1;
    }
}
