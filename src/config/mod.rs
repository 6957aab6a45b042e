//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `RANKER_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::analysis::primary_subtag;
use crate::constants::{
    DEFAULT_APP_NAME, DEFAULT_CACHE_TTL_SECS, DEFAULT_LANGUAGE, DEFAULT_LANGUAGES,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SENSITIVITY_K, DEFAULT_TAXONOMY_URL,
};
use crate::pertinence::PertinenceConfig;

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `RANKER_*` overrides on top of defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// HTTP server port. Default: `8000`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Taxonomy API root. Default: [`DEFAULT_TAXONOMY_URL`].
    pub taxonomy_url: String,

    /// `appname` sent to the taxonomy API.
    pub app_name: String,

    /// Directory for persisted taxonomy lists. Default: `./data`.
    pub storage_path: PathBuf,

    /// Path to the cross-encoder model directory (BERT + tokenizer). Unset runs the stub scorer.
    pub reranker_path: Option<PathBuf>,

    /// How long a fetched taxonomy stays fresh. Default: 24h.
    pub cache_ttl: Duration,

    /// `K` in `threshold = mean + K * std_dev`. Default: `1.0`.
    pub sensitivity_k: f64,

    /// Absolute minimum top score for a pertinent match. Default: none.
    pub score_floor: Option<f64>,

    /// Bound on one request's category work. Default: 30s.
    pub request_timeout: Duration,

    /// Language used when a request names none (or an unsupported one). `None` disables fallback.
    pub default_language: Option<String>,

    /// Languages taxonomies are served in.
    pub languages: Vec<String>,

    /// Populate the cache and warm the scorer before serving. Default: `true`.
    pub warm_on_start: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            taxonomy_url: DEFAULT_TAXONOMY_URL.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            storage_path: PathBuf::from("./data"),
            reranker_path: None,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            sensitivity_k: DEFAULT_SENSITIVITY_K,
            score_floor: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            default_language: Some(DEFAULT_LANGUAGE.to_string()),
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            warm_on_start: true,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "RANKER_PORT";
    const ENV_BIND_ADDR: &'static str = "RANKER_BIND_ADDR";
    const ENV_TAXONOMY_URL: &'static str = "RANKER_TAXONOMY_URL";
    const ENV_APP_NAME: &'static str = "RANKER_APP_NAME";
    const ENV_STORAGE_PATH: &'static str = "RANKER_STORAGE_PATH";
    const ENV_RERANKER_PATH: &'static str = "RANKER_RERANKER_PATH";
    const ENV_CACHE_TTL_SECS: &'static str = "RANKER_CACHE_TTL_SECS";
    const ENV_SENSITIVITY_K: &'static str = "RANKER_SENSITIVITY_K";
    const ENV_SCORE_FLOOR: &'static str = "RANKER_SCORE_FLOOR";
    const ENV_REQUEST_TIMEOUT_SECS: &'static str = "RANKER_REQUEST_TIMEOUT_SECS";
    const ENV_DEFAULT_LANGUAGE: &'static str = "RANKER_DEFAULT_LANGUAGE";
    const ENV_LANGUAGES: &'static str = "RANKER_LANGUAGES";
    const ENV_WARM_ON_START: &'static str = "RANKER_WARM_ON_START";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let taxonomy_url = Self::parse_string_from_env(Self::ENV_TAXONOMY_URL, defaults.taxonomy_url);
        let app_name = Self::parse_string_from_env(Self::ENV_APP_NAME, defaults.app_name);
        let storage_path = Self::parse_path_from_env(Self::ENV_STORAGE_PATH, defaults.storage_path);
        let reranker_path = Self::parse_optional_path_from_env(Self::ENV_RERANKER_PATH);
        let cache_ttl = Duration::from_secs(Self::parse_u64_from_env(
            Self::ENV_CACHE_TTL_SECS,
            defaults.cache_ttl.as_secs(),
        ));
        let sensitivity_k = Self::parse_f64_from_env(Self::ENV_SENSITIVITY_K)?
            .unwrap_or(defaults.sensitivity_k);
        let score_floor = Self::parse_f64_from_env(Self::ENV_SCORE_FLOOR)?;
        let request_timeout = Duration::from_secs(Self::parse_u64_from_env(
            Self::ENV_REQUEST_TIMEOUT_SECS,
            defaults.request_timeout.as_secs(),
        ));
        let default_language = match env::var(Self::ENV_DEFAULT_LANGUAGE) {
            Ok(value) => Some(primary_subtag(&value)).filter(|v| !v.is_empty()),
            Err(_) => defaults.default_language,
        };
        let languages = Self::parse_languages_from_env(Self::ENV_LANGUAGES).unwrap_or(defaults.languages);
        let warm_on_start = Self::parse_bool_from_env(Self::ENV_WARM_ON_START, defaults.warm_on_start);

        Ok(Self {
            port,
            bind_addr,
            taxonomy_url,
            app_name,
            storage_path,
            reranker_path,
            cache_ttl,
            sensitivity_k,
            score_floor,
            request_timeout,
            default_language,
            languages,
            warm_on_start,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_path.exists() && !self.storage_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.storage_path.clone(),
            });
        }

        if let Some(ref path) = self.reranker_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        reqwest::Url::parse(&self.taxonomy_url).map_err(|e| ConfigError::InvalidUrl {
            value: self.taxonomy_url.clone(),
            reason: e.to_string(),
        })?;

        if !self.sensitivity_k.is_finite() || self.sensitivity_k < 0.0 {
            return Err(ConfigError::InvalidSensitivity {
                value: self.sensitivity_k,
            });
        }

        if let Some(floor) = self.score_floor
            && !floor.is_finite()
        {
            return Err(ConfigError::InvalidFloor { value: floor });
        }

        if self.cache_ttl.is_zero() {
            return Err(ConfigError::ZeroDuration {
                name: Self::ENV_CACHE_TTL_SECS,
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration {
                name: Self::ENV_REQUEST_TIMEOUT_SECS,
            });
        }

        if self.languages.is_empty() {
            return Err(ConfigError::NoLanguages);
        }
        if let Some(ref language) = self.default_language
            && !self
                .languages
                .iter()
                .any(|l| primary_subtag(l) == primary_subtag(language))
        {
            return Err(ConfigError::UnsupportedDefaultLanguage {
                language: language.clone(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn pertinence(&self) -> PertinenceConfig {
        PertinenceConfig::new(self.sensitivity_k, self.score_floor)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Unset or blank is `Ok(None)`; anything else must parse.
    fn parse_f64_from_env(var_name: &'static str) -> Result<Option<f64>, ConfigError> {
        let Ok(value) = env::var(var_name) else {
            return Ok(None);
        };
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::FloatParseError {
                name: var_name,
                value: value.clone(),
                source: e,
            })
    }

    /// Comma-separated language tags, reduced to primary subtags with duplicates dropped.
    fn parse_languages_from_env(var_name: &str) -> Option<Vec<String>> {
        let value = env::var(var_name).ok()?;
        let mut items: Vec<String> = Vec::new();
        for item in value.split(',').map(primary_subtag) {
            if !item.is_empty() && !items.contains(&item) {
                items.push(item);
            }
        }
        (!items.is_empty()).then_some(items)
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        match env::var(var_name)
            .map(|v| v.trim().to_lowercase())
            .as_deref()
        {
            Ok("1" | "true" | "yes" | "on") => true,
            Ok("0" | "false" | "no" | "off") => false,
            _ => default,
        }
    }
}
