use thiserror::Error;

/// Request-level validation failures. Raised before any ranking work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("text must not be empty")]
    EmptyText,

    #[error("unsupported language '{language}'")]
    UnsupportedLanguage { language: String },

    #[error("language is required (no default language configured)")]
    LanguageRequired,
}
