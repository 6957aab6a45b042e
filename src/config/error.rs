//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("failed to parse {name} '{value}': {source}")]
    FloatParseError {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("invalid sensitivity {value}: must be finite and non-negative")]
    InvalidSensitivity { value: f64 },

    #[error("invalid score floor {value}: must be finite")]
    InvalidFloor { value: f64 },

    #[error("{name} must be greater than zero")]
    ZeroDuration { name: &'static str },

    #[error("invalid taxonomy URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    #[error("no supported languages configured")]
    NoLanguages,

    /// The fallback language is not one of the supported languages.
    #[error("default language '{language}' is not in the supported language list")]
    UnsupportedDefaultLanguage { language: String },

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
