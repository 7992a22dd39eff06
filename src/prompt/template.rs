//! `{name}` placeholder substitution.
//!
//! `{{` and `}}` stand for literal braces. Every placeholder must resolve or nothing is
//! produced.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use thiserror::Error;

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|\{|\}").expect("placeholder pattern is valid")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Missing value for placeholder '{0}'")]
    MissingField(String),

    #[error("Malformed placeholder at byte {position}")]
    Malformed { position: usize },
}

/// Values substituted into a template, keyed by placeholder name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fields(BTreeMap<String, String>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

enum Token<'t> {
    Literal(&'t str),
    Placeholder(&'t str),
}

fn tokenize(template: &str) -> Result<Vec<Token<'_>>, TemplateError> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in TOKEN.captures_iter(template) {
        let whole = caps.get(0).expect("capture 0 is the whole match");
        if whole.start() > last {
            tokens.push(Token::Literal(&template[last..whole.start()]));
        }
        match whole.as_str() {
            "{{" => tokens.push(Token::Literal("{")),
            "}}" => tokens.push(Token::Literal("}")),
            _ => match caps.get(1) {
                Some(name) if !name.as_str().is_empty() => {
                    tokens.push(Token::Placeholder(name.as_str()))
                }
                _ => {
                    return Err(TemplateError::Malformed {
                        position: whole.start(),
                    })
                }
            },
        }
        last = whole.end();
    }
    if last < template.len() {
        tokens.push(Token::Literal(&template[last..]));
    }

    Ok(tokens)
}

/// Names referenced by `template`, deduplicated, in order of first appearance.
pub fn placeholders(template: &str) -> Result<Vec<String>, TemplateError> {
    let mut names: Vec<String> = Vec::new();
    for token in tokenize(template)? {
        if let Token::Placeholder(name) = token {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Fills every placeholder in `template` from `fields`.
///
/// Fields the template does not mention are ignored.
pub fn compose(template: &str, fields: &Fields) -> Result<String, TemplateError> {
    let tokens = tokenize(template)?;

    if let Some(missing) = tokens.iter().find_map(|token| match token {
        Token::Placeholder(name) if !fields.contains(name) => Some(*name),
        _ => None,
    }) {
        return Err(TemplateError::MissingField(missing.to_string()));
    }

    let mut out = String::with_capacity(template.len());
    for token in tokens {
        match token {
            Token::Literal(text) => out.push_str(text),
            Token::Placeholder(name) => out.push_str(fields.get(name).unwrap_or_default()),
        }
    }
    Ok(out)
}
