//! Text generation against a hosted or local LLM.
//!
//! The only entry point the rest of the crate needs is [`generate`], which never fails:
//! every backend error is folded into [`GenerationResult::Failure`].

mod fake;
mod gemini;
mod ollama;

pub use fake::FakeGenerator;
pub use gemini::GeminiGenerator;
pub use ollama::OllamaGenerator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, ProviderConfig, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE};
use crate::TARGET_LLM_REQUEST;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Generation options sent with every request.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub web_search: bool,
}

impl GenOptions {
    /// Temperature is clamped to `[0, 1]`; a zero token ceiling falls back to the default.
    pub fn new(temperature: f32, max_output_tokens: u32, web_search: bool) -> Self {
        let temperature = if temperature.is_nan() {
            DEFAULT_TEMPERATURE
        } else {
            temperature.clamp(0.0, 1.0)
        };
        let max_output_tokens = if max_output_tokens == 0 {
            DEFAULT_MAX_OUTPUT_TOKENS
        } else {
            max_output_tokens
        };
        Self {
            temperature,
            max_output_tokens,
            web_search,
        }
    }
}

impl Default for GenOptions {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPERATURE, DEFAULT_MAX_OUTPUT_TOKENS, true)
    }
}

/// One submission to the model. Built fresh for every interaction.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: String,
    pub options: GenOptions,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationResult {
    Success(String),
    Failure(String),
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success(_))
    }
}

impl fmt::Display for GenerationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationResult::Success(text) => f.write_str(text),
            GenerationResult::Failure(reason) => write!(f, "Error: {}", reason),
        }
    }
}

/// A backend able to turn a request into model text.
#[async_trait]
pub trait TextGenerator: Send + Sync + fmt::Debug {
    async fn complete(&self, request: &GenerationRequest) -> Result<String, LlmError>;

    /// Short backend name for logs ("gemini", "ollama", "fake").
    fn provider_name(&self) -> &'static str;
}

/// Sends one request and folds the outcome into a [`GenerationResult`].
///
/// No retries and no caching: each call is a single round trip.
pub async fn generate(generator: &dyn TextGenerator, request: &GenerationRequest) -> GenerationResult {
    info!(
        target: TARGET_LLM_REQUEST,
        "Sending request to {} model {} (temperature={}, max_output_tokens={}, web_search={})",
        generator.provider_name(),
        request.model,
        request.options.temperature,
        request.options.max_output_tokens,
        request.options.web_search
    );
    debug!(target: TARGET_LLM_REQUEST, "Prompt: {}", request.prompt);

    let start = Instant::now();
    match generator.complete(request).await {
        Ok(text) => {
            let text = text.trim().to_string();
            info!(
                target: TARGET_LLM_REQUEST,
                "Received {} characters from {} in {:.2?}",
                text.len(),
                generator.provider_name(),
                start.elapsed()
            );
            debug!(target: TARGET_LLM_REQUEST, "Response: {}", text);
            GenerationResult::Success(text)
        }
        Err(e) => {
            warn!(
                target: TARGET_LLM_REQUEST,
                "Generation with {} failed after {:.2?}: {}",
                generator.provider_name(),
                start.elapsed(),
                e
            );
            let mut reason = e.to_string();
            if reason.trim().is_empty() {
                reason = format!("{} request failed", generator.provider_name());
            }
            GenerationResult::Failure(reason)
        }
    }
}

/// True when generated text carries nothing to show: empty, or opening with one of the
/// lower-cased `markers` (e.g. "no relevant news found").
pub fn is_empty_result(text: &str, markers: &[String]) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return true;
    }
    let lowered = text.to_lowercase();
    markers
        .iter()
        .any(|marker| !marker.is_empty() && lowered.starts_with(marker.as_str()))
}

/// Builds the backend named by the configuration.
pub fn create_generator(config: &AppConfig) -> Result<Box<dyn TextGenerator>, LlmError> {
    match &config.provider {
        ProviderConfig::Gemini(auth) => Ok(Box::new(GeminiGenerator::new(
            auth.clone(),
            config.request_timeout,
        )?)),
        ProviderConfig::Ollama { host, port } => {
            Ok(Box::new(OllamaGenerator::new(host.clone(), *port)))
        }
    }
}
