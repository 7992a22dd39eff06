//! Google Gemini provider, over either the Generative Language API or Vertex AI.

use super::{GenerationRequest, LlmError, TextGenerator};
use crate::config::GeminiAuth;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GENERATIVE_LANGUAGE_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug)]
pub struct GeminiGenerator {
    auth: GeminiAuth,
    client: reqwest::Client,
}

impl GeminiGenerator {
    pub fn new(auth: GeminiAuth, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::NotConfigured(format!("HTTP client: {}", e)))?;
        Ok(Self { auth, client })
    }

    fn endpoint(&self, model: &str) -> String {
        endpoint_for(&self.auth, model)
    }
}

pub(crate) fn endpoint_for(auth: &GeminiAuth, model: &str) -> String {
    match auth {
        GeminiAuth::ApiKey(_) => {
            format!("{}/models/{}:generateContent", GENERATIVE_LANGUAGE_BASE, model)
        }
        GeminiAuth::Vertex {
            project, location, ..
        } => {
            let host = if location == "global" {
                "aiplatform.googleapis.com".to_string()
            } else {
                format!("{}-aiplatform.googleapis.com", location)
            };
            format!(
                "https://{}/v1beta1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
                host, project, location, model
            )
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

fn build_body(request: &GenerationRequest) -> GenerateContentRequest<'_> {
    let system_instruction = if request.system_instruction.trim().is_empty() {
        None
    } else {
        Some(SystemInstruction {
            parts: vec![Part {
                text: &request.system_instruction,
            }],
        })
    };
    let tools = if request.options.web_search {
        vec![Tool {
            google_search: GoogleSearch {},
        }]
    } else {
        Vec::new()
    };

    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
        system_instruction,
        tools,
        generation_config: GenerationConfig {
            temperature: request.options.temperature,
            max_output_tokens: request.options.max_output_tokens,
        },
    }
}

/// Joins the text parts of the first candidate.
fn extract_text(body: &str) -> Result<String, LlmError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| LlmError::ParseError(e.to_string()))?;

    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(LlmError::ParseError(format!("Prompt was blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(LlmError::EmptyResponse)?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(match candidate.finish_reason {
            Some(reason) => {
                LlmError::ParseError(format!("No text in response (finish reason: {})", reason))
            }
            None => LlmError::EmptyResponse,
        });
    }

    Ok(text)
}

fn api_error(status: u16, body: String) -> LlmError {
    match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(parsed) => LlmError::ApiError {
            status,
            message: match parsed.error.status {
                Some(code) => format!("{}: {}", code, parsed.error.message),
                None => parsed.error.message,
            },
        },
        Err(_) => LlmError::ApiError {
            status,
            message: body,
        },
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn complete(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let body = build_body(request);
        let mut http = self.client.post(self.endpoint(&request.model)).json(&body);
        http = match &self.auth {
            GeminiAuth::ApiKey(key) => http.header("x-goog-api-key", key),
            GeminiAuth::Vertex { access_token, .. } => http.bearer_auth(access_token),
        };

        let response = http
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(LlmError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(api_error(status, body));
        }

        extract_text(&body)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenOptions;

    fn request(web_search: bool) -> GenerationRequest {
        GenerationRequest {
            model: "gemini-2.0-flash-001".to_string(),
            prompt: "Describe Gurgaon".to_string(),
            system_instruction: "You are a helpful real-estate agent.".to_string(),
            options: GenOptions::new(0.7, 8192, web_search),
        }
    }

    #[test]
    fn test_body_shape_with_search_tool() {
        let req = request(true);
        let json = serde_json::to_value(build_body(&req)).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Describe Gurgaon");
        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "You are a helpful real-estate agent."
        );
        assert_eq!(json["tools"][0]["googleSearch"], serde_json::json!({}));
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[test]
    fn test_body_omits_tools_without_search() {
        let req = request(false);
        let json = serde_json::to_value(build_body(&req)).unwrap();
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "**Pune**\n"}, {"text": "- Metro"}]},
                "finishReason": "STOP"
            }]
        }"#;
        assert_eq!(extract_text(body).unwrap(), "**Pune**\n- Metro");
    }

    #[test]
    fn test_extract_text_reports_missing_text() {
        let body = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let err = extract_text(body).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));

        assert!(matches!(
            extract_text(r#"{"candidates": []}"#),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(
            extract_text("not json"),
            Err(LlmError::ParseError(_))
        ));
    }

    #[test]
    fn test_api_error_message() {
        let err = api_error(
            400,
            r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#
                .to_string(),
        );
        assert_eq!(
            err.to_string(),
            "API returned error: 400 - INVALID_ARGUMENT: API key not valid"
        );
    }

    #[test]
    fn test_vertex_endpoints() {
        let regional = GeminiAuth::Vertex {
            project: "acme".to_string(),
            location: "us-central1".to_string(),
            access_token: "t".to_string(),
        };
        assert_eq!(
            endpoint_for(&regional, "gemini-2.0-flash-001"),
            "https://us-central1-aiplatform.googleapis.com/v1beta1/projects/acme/locations/us-central1/publishers/google/models/gemini-2.0-flash-001:generateContent"
        );

        let global = GeminiAuth::Vertex {
            project: "acme".to_string(),
            location: "global".to_string(),
            access_token: "t".to_string(),
        };
        assert!(endpoint_for(&global, "m").starts_with("https://aiplatform.googleapis.com/"));
    }
}
