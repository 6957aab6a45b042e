use serde::Deserialize;
use tracing::debug;

use super::error::AnalysisError;

/// Body of an analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnalysisRequest {
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
}

impl AnalysisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Maps requested language tags onto the languages taxonomies are kept in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePolicy {
    supported: Vec<String>,
    fallback: Option<String>,
}

/// Lowercased primary subtag: `"fr-CA"` and `"FR_ca"` both become `"fr"`.
pub fn primary_subtag(tag: &str) -> String {
    tag.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

impl LanguagePolicy {
    pub fn new(supported: Vec<String>, fallback: Option<String>) -> Self {
        let supported = supported.iter().map(|l| primary_subtag(l)).collect();
        let fallback = fallback
            .map(|l| primary_subtag(&l))
            .filter(|l| !l.is_empty());
        Self {
            supported,
            fallback,
        }
    }

    pub fn supported(&self) -> &[String] {
        &self.supported
    }

    pub fn fallback(&self) -> Option<&str> {
        self.fallback.as_deref()
    }

    /// Picks the language to rank in.
    ///
    /// A missing or unsupported language resolves to the fallback; without a fallback it is
    /// a validation error.
    pub fn resolve(&self, requested: Option<&str>) -> Result<String, AnalysisError> {
        let requested = requested
            .map(primary_subtag)
            .filter(|l| !l.is_empty());

        match requested {
            Some(language) if self.supported.contains(&language) => Ok(language),
            Some(language) => match &self.fallback {
                Some(fallback) => {
                    debug!(requested = %language, fallback = %fallback, "Unsupported language, using fallback");
                    Ok(fallback.clone())
                }
                None => Err(AnalysisError::UnsupportedLanguage { language }),
            },
            None => self.fallback.clone().ok_or(AnalysisError::LanguageRequired),
        }
    }
}
