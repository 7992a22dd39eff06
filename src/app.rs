//! Interaction handlers: one per user action.
//!
//! Handlers take the session by value and hand it back, so whatever drives them owns
//! the state and decides where it lives between interactions.

use thiserror::Error;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::document::{self, DescriptionBlock, DocxError, DOCX_MIME};
use crate::llm::{generate, is_empty_result, GenerationRequest, GenerationResult, TextGenerator};
use crate::prompt::{
    city_fields, compose, micromarket_fields, news_fields, normalize_localities, DateRange,
    Fields, PromptKind, TemplateError,
};
use crate::session::{SessionState, Slot};
use crate::TARGET_APP;

pub const DEFAULT_CITY_NAME: &str = "city";
pub const DEFAULT_MICROMARKET_NAME: &str = "micromarket";

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("A {0} is required")]
    MissingInput(&'static str),

    #[error(transparent)]
    Document(#[from] DocxError),
}

/// What the user sees after an interaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Generated Markdown to display.
    Content(String),
    /// Nothing to show; an informational notice, not an error.
    Empty(String),
    /// The generation failed; the message starts with "Error".
    Failed(String),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedDocument {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

fn require<'a>(value: &'a str, what: &'static str) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        Err(AppError::MissingInput(what))
    } else {
        Ok(value)
    }
}

async fn run_prompt(
    kind: PromptKind,
    model: &str,
    template: &str,
    fields: &Fields,
    config: &AppConfig,
    generator: &dyn TextGenerator,
) -> Result<GenerationResult, AppError> {
    let request = GenerationRequest {
        model: model.to_string(),
        prompt: compose(template, fields)?,
        system_instruction: kind.system_instruction().to_string(),
        options: config.options,
    };
    Ok(generate(generator, &request).await)
}

fn to_outcome(
    kind: PromptKind,
    result: GenerationResult,
    config: &AppConfig,
    empty_notice: impl FnOnce() -> String,
) -> Outcome {
    match result {
        GenerationResult::Success(text) if is_empty_result(&text, &config.no_result_markers) => {
            Outcome::Empty(empty_notice())
        }
        GenerationResult::Success(text) => Outcome::Content(text),
        GenerationResult::Failure(reason) => {
            Outcome::Failed(format!("Error generating {}: {}", kind.label(), reason))
        }
    }
}

/// Generates a city description and remembers it for export.
pub async fn describe_city(
    mut state: SessionState,
    config: &AppConfig,
    generator: &dyn TextGenerator,
    city: &str,
    template: &str,
) -> Result<(SessionState, Outcome), AppError> {
    let city = require(city, "city")?;
    info!(target: TARGET_APP, "Generating city description for {}", city);

    let result = run_prompt(
        PromptKind::City,
        &config.model,
        template,
        &city_fields(city),
        config,
        generator,
    )
    .await?;
    let outcome = to_outcome(PromptKind::City, result, config, || {
        format!("No description was generated for {}.", city)
    });

    match &outcome {
        Outcome::Content(text) => {
            state.set(Slot::CityDescription, text.as_str());
            state.set(Slot::CityName, city);
        }
        Outcome::Failed(message) => warn!(target: TARGET_APP, "{}", message),
        Outcome::Empty(_) => {}
    }

    Ok((state, outcome))
}

/// Generates a micro-market description and remembers it for export.
pub async fn describe_micromarket<S: AsRef<str>>(
    mut state: SessionState,
    config: &AppConfig,
    generator: &dyn TextGenerator,
    city: &str,
    micromarket: &str,
    localities: &[S],
    template: &str,
) -> Result<(SessionState, Outcome), AppError> {
    let city = require(city, "city")?;
    let micromarket = require(micromarket, "micro market")?;
    let localities = normalize_localities(localities);
    info!(
        target: TARGET_APP,
        "Generating micro market description for {} in {} ({} localities)",
        micromarket,
        city,
        localities.len()
    );

    let result = run_prompt(
        PromptKind::Micromarket,
        &config.model,
        template,
        &micromarket_fields(city, micromarket, &localities),
        config,
        generator,
    )
    .await?;
    let outcome = to_outcome(PromptKind::Micromarket, result, config, || {
        format!("No description was generated for {} in {}.", micromarket, city)
    });

    match &outcome {
        Outcome::Content(text) => {
            state.set(Slot::MicromarketDescription, text.as_str());
            state.set(Slot::MicromarketName, micromarket);
            state.set(Slot::MicroCityName, city);
        }
        Outcome::Failed(message) => warn!(target: TARGET_APP, "{}", message),
        Outcome::Empty(_) => {}
    }

    Ok((state, outcome))
}

/// Fetches civic news for `city` over `range`. News is not kept in the session.
pub async fn fetch_news(
    config: &AppConfig,
    generator: &dyn TextGenerator,
    city: &str,
    range: &DateRange,
    template: &str,
) -> Result<Outcome, AppError> {
    let city = require(city, "city")?;
    info!(
        target: TARGET_APP,
        "Fetching news for {} from {} to {}",
        city,
        range.start_str(),
        range.end_str()
    );

    let result = run_prompt(
        PromptKind::News,
        &config.news_model,
        template,
        &news_fields(city, range),
        config,
        generator,
    )
    .await?;

    Ok(to_outcome(PromptKind::News, result, config, || {
        format!(
            "No relevant news found for specific localities in {} from {} to {}.",
            city,
            range.start_str(),
            range.end_str()
        )
    }))
}

/// Builds the combined document from whatever descriptions the session holds.
///
/// Returns `None` when neither description has been generated yet.
pub fn export_document(state: &SessionState) -> Result<Option<ExportedDocument>, AppError> {
    if !state.contains(Slot::CityDescription) && !state.contains(Slot::MicromarketDescription) {
        return Ok(None);
    }

    let blocks = [
        DescriptionBlock::primary(state.get(Slot::CityDescription).unwrap_or_default()),
        DescriptionBlock::secondary(state.get(Slot::MicromarketDescription).unwrap_or_default()),
    ];
    let bytes = document::render(&blocks)?;
    let filename = document::export_filename(
        state
            .get(Slot::MicromarketName)
            .unwrap_or(DEFAULT_MICROMARKET_NAME),
        state.get(Slot::CityName).unwrap_or(DEFAULT_CITY_NAME),
    );
    info!(target: TARGET_APP, "Rendered {} ({} bytes)", filename, bytes.len());

    Ok(Some(ExportedDocument {
        filename,
        mime: DOCX_MIME,
        bytes,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{FakeGenerator, LlmError};
    use crate::prompt::{city_template, micromarket_template, news_template, TimeFrame};
    use chrono::NaiveDate;

    fn range() -> DateRange {
        let now = NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        DateRange::ending_at(now, TimeFrame::Weekly)
    }

    #[tokio::test]
    async fn test_describe_city_stores_description() {
        let config = AppConfig::for_tests();
        let fake = FakeGenerator::with_response("city Gurgaon", "**Gurgaon City Description**\n- Millennium City\n");

        let (state, outcome) = describe_city(SessionState::new(), &config, &fake, " Gurgaon ", &city_template())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Content("**Gurgaon City Description**\n- Millennium City".to_string())
        );
        assert_eq!(state.get(Slot::CityName), Some("Gurgaon"));
        assert_eq!(
            state.get(Slot::CityDescription),
            Some("**Gurgaon City Description**\n- Millennium City")
        );

        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, config.model);
        assert_eq!(requests[0].options.max_output_tokens, 8192);
        assert!(requests[0].system_instruction.contains("real-estate agent"));
        assert!(!requests[0].prompt.contains("{city}"));
    }

    #[tokio::test]
    async fn test_describe_city_failure_keeps_previous_description() {
        let config = AppConfig::for_tests();
        let mut state = SessionState::new();
        state.set(Slot::CityDescription, "old");
        state.set(Slot::CityName, "Pune");

        let fake = FakeGenerator::failing(LlmError::RateLimited {
            retry_after_secs: Some(30),
        });
        let (state, outcome) = describe_city(state, &config, &fake, "Noida", &city_template())
            .await
            .unwrap();

        match outcome {
            Outcome::Failed(message) => {
                assert!(message.starts_with("Error generating city description: "));
                assert!(message.contains("Rate limited"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(state.get(Slot::CityDescription), Some("old"));
        assert_eq!(state.get(Slot::CityName), Some("Pune"));
    }

    #[tokio::test]
    async fn test_missing_placeholder_is_an_error() {
        let config = AppConfig::for_tests();
        let fake = FakeGenerator::new().with_default_response("unused");

        let err = describe_city(SessionState::new(), &config, &fake, "Delhi", "About {city} near {landmark}")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Template(TemplateError::MissingField(ref name)) if name == "landmark"
        ));
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_blank_city_rejected() {
        let config = AppConfig::for_tests();
        let fake = FakeGenerator::new();
        let err = describe_city(SessionState::new(), &config, &fake, "   ", &city_template())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingInput("city")));
    }

    #[tokio::test]
    async fn test_describe_micromarket_with_localities() {
        let config = AppConfig::for_tests();
        let fake = FakeGenerator::new().with_default_response("**Golf Course Road Micro Market Description**");

        let (state, outcome) = describe_micromarket(
            SessionState::new(),
            &config,
            &fake,
            "Gurgaon",
            "Golf Course Road",
            &["Sector 54", "DLF Phase 5"],
            &micromarket_template(),
        )
        .await
        .unwrap();

        assert!(matches!(outcome, Outcome::Content(_)));
        assert_eq!(state.get(Slot::MicromarketName), Some("Golf Course Road"));
        assert_eq!(state.get(Slot::MicroCityName), Some("Gurgaon"));
        assert!(fake.requests()[0]
            .prompt
            .contains("these localities: Sector 54, DLF Phase 5."));
    }

    #[tokio::test]
    async fn test_news_empty_notice() {
        let config = AppConfig::for_tests();
        let fake = FakeGenerator::new().with_default_response("No relevant news found.");

        let outcome = fetch_news(&config, &fake, "Pune", &range(), &news_template())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Empty(
                "No relevant news found for specific localities in Pune from 2025-02-26 to 2025-03-05."
                    .to_string()
            )
        );
        let requests = fake.requests();
        assert_eq!(requests[0].model, config.news_model);
        assert!(requests[0].system_instruction.contains("news curator"));
    }

    #[tokio::test]
    async fn test_news_content_and_failure() {
        let config = AppConfig::for_tests();
        let fake = FakeGenerator::with_response("city of Pune", "- Pune, Baner: metro work begins");
        let outcome = fetch_news(&config, &fake, "Pune", &range(), &news_template())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Content("- Pune, Baner: metro work begins".to_string())
        );

        let failing = FakeGenerator::failing(LlmError::RequestFailed("connection reset".to_string()));
        let outcome = fetch_news(&config, &failing, "Pune", &range(), &news_template())
            .await
            .unwrap();
        assert!(outcome.is_failure());
    }

    #[tokio::test]
    async fn test_describe_micromarket_skips_blank_localities() {
        let config = AppConfig::for_tests();
        let fake = FakeGenerator::new().with_default_response("**Sohna Road Micro Market Description**");

        let localities = ["", "  Sector 49 ", " ", "Sector 48"];
        let (state, _) = describe_micromarket(
            SessionState::new(),
            &config,
            &fake,
            "Gurgaon",
            "Sohna Road",
            &localities,
            &micromarket_template(),
        )
        .await
        .unwrap();

        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0]
            .prompt
            .contains(" Give particular attention to these localities: Sector 49, Sector 48."));
        assert!(!requests[0].prompt.contains(", ,"));
        assert_eq!(state.get(Slot::MicromarketName), Some("Sohna Road"));
    }

    #[test]
    fn test_export_requires_a_description() {
        assert_eq!(export_document(&SessionState::new()).unwrap(), None);
    }

    #[test]
    fn test_export_filename_defaults() {
        let mut state = SessionState::new();
        state.set(Slot::CityDescription, "**Gurgaon**");
        state.set(Slot::CityName, "Gurgaon");

        let exported = export_document(&state).unwrap().unwrap();
        assert_eq!(exported.filename, "micromarket_Gurgaon_description.docx");
        assert_eq!(exported.mime, DOCX_MIME);
        assert_eq!(&exported.bytes[..2], b"PK");
    }
}
