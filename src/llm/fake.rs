//! Fake text generator for tests.
//!
//! Responses are matched by checking whether the prompt contains a registered
//! substring, so tests run without network access.

use super::{GenerationRequest, LlmError, TextGenerator};
use async_trait::async_trait;
use std::sync::{Mutex, RwLock};

#[derive(Debug, Default)]
pub struct FakeGenerator {
    /// (prompt substring, response) pairs, checked in insertion order
    responses: RwLock<Vec<(String, String)>>,
    default_response: Option<String>,
    /// When set, every call fails with this error message
    failure: Option<FailureKind>,
    requests: Mutex<Vec<GenerationRequest>>,
}

#[derive(Debug, Clone)]
enum FailureKind {
    Api { status: u16, message: String },
    Request(String),
    RateLimited(Option<u64>),
    Empty,
}

impl FakeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let provider = Self::new();
        provider.add_response(prompt_contains, response);
        provider
    }

    /// A generator whose every call fails with (a copy of) `error`.
    pub fn failing(error: LlmError) -> Self {
        let failure = match error {
            LlmError::ApiError { status, message } => FailureKind::Api { status, message },
            LlmError::RateLimited { retry_after_secs } => FailureKind::RateLimited(retry_after_secs),
            LlmError::EmptyResponse => FailureKind::Empty,
            other => FailureKind::Request(other.to_string()),
        };
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn add_response(&self, prompt_contains: &str, response: &str) {
        self.responses
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((prompt_contains.to_string(), response.to_string()));
    }

    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn complete(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        if let Some(failure) = &self.failure {
            return Err(match failure.clone() {
                FailureKind::Api { status, message } => LlmError::ApiError { status, message },
                FailureKind::Request(message) => LlmError::RequestFailed(message),
                FailureKind::RateLimited(retry_after_secs) => {
                    LlmError::RateLimited { retry_after_secs }
                }
                FailureKind::Empty => LlmError::EmptyResponse,
            });
        }

        let responses = self.responses.read().unwrap_or_else(|e| e.into_inner());
        if let Some((_, response)) = responses
            .iter()
            .find(|(pattern, _)| request.prompt.contains(pattern.as_str()))
        {
            return Ok(response.clone());
        }

        self.default_response.clone().ok_or_else(|| {
            LlmError::RequestFailed(format!(
                "FakeGenerator: no response registered for prompt ({} chars)",
                request.prompt.len()
            ))
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
