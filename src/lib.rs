pub mod app;
pub mod config;
pub mod document;
pub mod environment;
pub mod llm;
pub mod logging;
pub mod prompt;
pub mod session;
pub mod taxonomy;

pub const TARGET_LLM_REQUEST: &str = "llm_request";
pub const TARGET_APP: &str = "app";

pub use app::Outcome;
pub use config::AppConfig;
pub use document::{render, DescriptionBlock, DOCX_MIME};
pub use llm::{generate, GenOptions, GenerationRequest, GenerationResult, TextGenerator};
pub use prompt::{compose, Fields, TemplateError};
pub use session::{SessionState, Slot};
