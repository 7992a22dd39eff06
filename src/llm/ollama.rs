use async_trait::async_trait;
use ollama_rs::generation::completion::request::GenerationRequest as OllamaRequest;
use ollama_rs::generation::options::GenerationOptions;
use ollama_rs::Ollama;
use tracing::warn;

use super::{GenerationRequest, LlmError, TextGenerator};
use crate::TARGET_LLM_REQUEST;

/// Local models served by Ollama. There is no search tool, so answers come from the
/// model's own knowledge.
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    ollama: Ollama,
}

impl OllamaGenerator {
    pub fn new(host: String, port: u16) -> Self {
        Self {
            ollama: Ollama::new(host, port),
        }
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn complete(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        if request.options.web_search {
            warn!(target: TARGET_LLM_REQUEST, "Web search is not available with Ollama, ignoring");
        }

        let num_predict = i32::try_from(request.options.max_output_tokens).unwrap_or(i32::MAX);
        let mut ollama_request = OllamaRequest::new(request.model.clone(), request.prompt.clone());
        ollama_request.system = Some(request.system_instruction.clone().into());
        ollama_request.options = Some(
            GenerationOptions::default()
                .temperature(request.options.temperature)
                .num_predict(num_predict),
        );

        let response = self
            .ollama
            .generate(ollama_request)
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        Ok(response.response)
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }
}
