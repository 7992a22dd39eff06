mod common;
mod description;
mod news;
mod template;

pub use common::{NEWS_CATEGORIES, NEWS_SYSTEM_INSTRUCTION, REAL_ESTATE_SYSTEM_INSTRUCTION};
pub use description::{
    city_fields, city_template, micromarket_fields, micromarket_template, normalize_localities,
};
pub use news::{news_fields, news_template, DateRange, TimeFrame};
pub use template::{compose, placeholders, Fields, TemplateError};

/// The three prompt variants the tool knows how to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptKind {
    City,
    Micromarket,
    News,
}

impl PromptKind {
    pub fn default_template(self) -> String {
        match self {
            PromptKind::City => city_template(),
            PromptKind::Micromarket => micromarket_template(),
            PromptKind::News => news_template(),
        }
    }

    pub fn system_instruction(self) -> &'static str {
        match self {
            PromptKind::City | PromptKind::Micromarket => REAL_ESTATE_SYSTEM_INSTRUCTION,
            PromptKind::News => NEWS_SYSTEM_INSTRUCTION,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PromptKind::City => "city description",
            PromptKind::Micromarket => "micro market description",
            PromptKind::News => "news",
        }
    }
}
