//! Process-wide configuration, read once from the environment at startup.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::environment::{get_env_var, get_env_var_as_vec, get_env_var_parsed, parse_bool};
use crate::llm::GenOptions;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";
pub const DEFAULT_NEWS_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;
pub const DEFAULT_LOCATION: &str = "us-central1";
pub const DEFAULT_NO_RESULT_MARKER: &str = "no relevant";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Unknown LLM provider: {0}")]
    UnknownProvider(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

/// How requests reach the hosted Gemini model.
#[derive(Clone, Debug, PartialEq)]
pub enum GeminiAuth {
    /// Generative Language API with an API key.
    ApiKey(String),
    /// Vertex AI with an OAuth bearer token.
    Vertex {
        project: String,
        location: String,
        access_token: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProviderConfig {
    Gemini(GeminiAuth),
    Ollama { host: String, port: u16 },
}

impl ProviderConfig {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderConfig::Gemini(_) => "gemini",
            ProviderConfig::Ollama { .. } => "ollama",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    /// Model used for city and micro-market descriptions.
    pub model: String,
    /// Model used for news summaries.
    pub news_model: String,
    pub options: GenOptions,
    pub request_timeout: Duration,
    pub log_dir: PathBuf,
    /// Lower-cased prefixes that mark a response as "nothing found".
    pub no_result_markers: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider_name = get_env_var("LLM_PROVIDER").unwrap_or_else(|| "gemini".to_string());

        let provider = match provider_name.to_ascii_lowercase().as_str() {
            "gemini" => ProviderConfig::Gemini(gemini_auth_from_env()?),
            "ollama" => {
                let host = get_env_var("OLLAMA_HOST").unwrap_or_else(|| "http://localhost".to_string());
                let port = get_env_var_parsed("OLLAMA_PORT", 11434u16).map_err(|value| {
                    ConfigError::InvalidValue {
                        var: "OLLAMA_PORT",
                        value,
                    }
                })?;
                ProviderConfig::Ollama { host, port }
            }
            other => return Err(ConfigError::UnknownProvider(other.to_string())),
        };

        let default_model = match provider {
            ProviderConfig::Gemini(_) => DEFAULT_MODEL,
            ProviderConfig::Ollama { .. } => DEFAULT_OLLAMA_MODEL,
        };
        let model = get_env_var("LLM_MODEL").unwrap_or_else(|| default_model.to_string());
        let news_model = get_env_var("LLM_NEWS_MODEL").unwrap_or_else(|| match provider {
            ProviderConfig::Gemini(_) => DEFAULT_NEWS_MODEL.to_string(),
            ProviderConfig::Ollama { .. } => model.clone(),
        });

        let temperature = get_env_var_parsed("LLM_TEMPERATURE", DEFAULT_TEMPERATURE)
            .map_err(|value| ConfigError::InvalidValue {
                var: "LLM_TEMPERATURE",
                value,
            })?;
        let max_output_tokens = get_env_var_parsed("LLM_MAX_OUTPUT_TOKENS", DEFAULT_MAX_OUTPUT_TOKENS)
            .map_err(|value| ConfigError::InvalidValue {
                var: "LLM_MAX_OUTPUT_TOKENS",
                value,
            })?;
        if max_output_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                var: "LLM_MAX_OUTPUT_TOKENS",
                value: "0".to_string(),
            });
        }
        let web_search = match get_env_var("LLM_WEB_SEARCH") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidValue {
                var: "LLM_WEB_SEARCH",
                value: raw,
            })?,
            None => true,
        };
        let timeout_secs = get_env_var_parsed("LLM_REQUEST_TIMEOUT_SECS", 120u64).map_err(|value| {
            ConfigError::InvalidValue {
                var: "LLM_REQUEST_TIMEOUT_SECS",
                value,
            }
        })?;

        let mut no_result_markers: Vec<String> = get_env_var_as_vec("NO_RESULT_MARKERS", ',')
            .into_iter()
            .map(|m| m.to_lowercase())
            .collect();
        if no_result_markers.is_empty() {
            no_result_markers.push(DEFAULT_NO_RESULT_MARKER.to_string());
        }

        Ok(Self {
            provider,
            model,
            news_model,
            options: GenOptions::new(temperature, max_output_tokens, web_search),
            request_timeout: Duration::from_secs(timeout_secs),
            log_dir: get_env_var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs")),
            no_result_markers,
        })
    }

    /// A configuration suitable for tests: fake credentials, default options.
    pub fn for_tests() -> Self {
        Self {
            provider: ProviderConfig::Gemini(GeminiAuth::ApiKey("test-key".to_string())),
            model: DEFAULT_MODEL.to_string(),
            news_model: DEFAULT_NEWS_MODEL.to_string(),
            options: GenOptions::default(),
            request_timeout: Duration::from_secs(5),
            log_dir: PathBuf::from("logs"),
            no_result_markers: vec![DEFAULT_NO_RESULT_MARKER.to_string()],
        }
    }
}

fn gemini_auth_from_env() -> Result<GeminiAuth, ConfigError> {
    if let Some(key) = get_env_var("GEMINI_API_KEY") {
        return Ok(GeminiAuth::ApiKey(key));
    }

    match (get_env_var("GOOGLE_CLOUD_PROJECT"), get_env_var("GOOGLE_ACCESS_TOKEN")) {
        (Some(project), Some(access_token)) => Ok(GeminiAuth::Vertex {
            project,
            location: get_env_var("GOOGLE_CLOUD_LOCATION")
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            access_token,
        }),
        _ => Err(ConfigError::MissingCredentials(
            "set GEMINI_API_KEY, or GOOGLE_CLOUD_PROJECT and GOOGLE_ACCESS_TOKEN \
             (for example from `gcloud auth print-access-token`)"
                .to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    const VARS: &[&str] = &[
        "LLM_PROVIDER",
        "LLM_MODEL",
        "LLM_NEWS_MODEL",
        "LLM_TEMPERATURE",
        "LLM_MAX_OUTPUT_TOKENS",
        "LLM_WEB_SEARCH",
        "LLM_REQUEST_TIMEOUT_SECS",
        "NO_RESULT_MARKERS",
        "LOG_DIR",
        "GEMINI_API_KEY",
        "GOOGLE_CLOUD_PROJECT",
        "GOOGLE_ACCESS_TOKEN",
        "GOOGLE_CLOUD_LOCATION",
        "OLLAMA_HOST",
        "OLLAMA_PORT",
    ];

    fn clear_vars() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    // These variables are process-wide, so every from_env case runs in this one test.
    #[test]
    fn test_from_env() {
        clear_vars();
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::MissingCredentials(_))
        ));

        // Defaults with Vertex credentials.
        env::set_var("GOOGLE_CLOUD_PROJECT", "brief-project");
        env::set_var("GOOGLE_ACCESS_TOKEN", "ya29.token");
        let config = AppConfig::from_env().unwrap();
        assert_eq!(
            config.provider,
            ProviderConfig::Gemini(GeminiAuth::Vertex {
                project: "brief-project".to_string(),
                location: DEFAULT_LOCATION.to_string(),
                access_token: "ya29.token".to_string(),
            })
        );
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.news_model, DEFAULT_NEWS_MODEL);
        assert_eq!(config.options.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(config.options.max_output_tokens, DEFAULT_MAX_OUTPUT_TOKENS);
        assert!(config.options.web_search);
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.no_result_markers, vec![DEFAULT_NO_RESULT_MARKER.to_string()]);

        // API key wins over Vertex; markers are a comma list.
        env::set_var("GEMINI_API_KEY", "key-123");
        env::set_var("NO_RESULT_MARKERS", "No relevant, Nothing found");
        env::set_var("LLM_TEMPERATURE", "1.5");
        env::set_var("LLM_WEB_SEARCH", "off");
        let config = AppConfig::from_env().unwrap();
        assert_eq!(
            config.provider,
            ProviderConfig::Gemini(GeminiAuth::ApiKey("key-123".to_string()))
        );
        assert_eq!(
            config.no_result_markers,
            vec!["no relevant".to_string(), "nothing found".to_string()]
        );
        assert!(crate::llm::is_empty_result(
            "Nothing found for Pune.",
            &config.no_result_markers
        ));
        assert_eq!(config.options.temperature, 1.0);
        assert!(!config.options.web_search);

        env::set_var("LLM_MAX_OUTPUT_TOKENS", "0");
        assert_eq!(
            AppConfig::from_env().unwrap_err(),
            ConfigError::InvalidValue {
                var: "LLM_MAX_OUTPUT_TOKENS",
                value: "0".to_string(),
            }
        );
        env::set_var("LLM_MAX_OUTPUT_TOKENS", "many");
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::InvalidValue { var: "LLM_MAX_OUTPUT_TOKENS", .. })
        ));
        env::remove_var("LLM_MAX_OUTPUT_TOKENS");

        env::set_var("LLM_PROVIDER", "Ollama");
        env::set_var("OLLAMA_PORT", "11500");
        let config = AppConfig::from_env().unwrap();
        assert_eq!(
            config.provider,
            ProviderConfig::Ollama {
                host: "http://localhost".to_string(),
                port: 11500,
            }
        );
        assert_eq!(config.model, DEFAULT_OLLAMA_MODEL);
        assert_eq!(config.news_model, DEFAULT_OLLAMA_MODEL);

        env::set_var("LLM_PROVIDER", "claude");
        assert_eq!(
            AppConfig::from_env().unwrap_err(),
            ConfigError::UnknownProvider("claude".to_string())
        );

        clear_vars();
    }

    #[test]
    fn test_config_for_tests_uses_generation_defaults() {
        let config = AppConfig::for_tests();
        assert_eq!(config.options.max_output_tokens, DEFAULT_MAX_OUTPUT_TOKENS);
        assert!(config.options.web_search);
        assert_eq!(config.provider.name(), "gemini");
    }
}
