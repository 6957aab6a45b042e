//! Cross-cutting, shared constants.
//!
//! Module-specific defaults live next to the code that uses them; the values here are the
//! ones that more than one module (config, taxonomy, pertinence, gateway) needs to agree on.

use std::time::Duration;

/// ReliefWeb API root used when `RANKER_TAXONOMY_URL` is not set.
pub const DEFAULT_TAXONOMY_URL: &str = "https://api.reliefweb.int/v2";

/// `appname` sent with every taxonomy request.
pub const DEFAULT_APP_NAME: &str = "reliefweb-content-ranker";

/// Upper bound on entries requested per taxonomy fetch.
pub const TAXONOMY_FETCH_LIMIT: usize = 1000;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(DEFAULT_CACHE_TTL_SECS);

/// Default `K` in `threshold = mean + K * stddev`.
pub const DEFAULT_SENSITIVITY_K: f64 = 1.0;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Timeout applied to a single taxonomy HTTP request.
pub const TAXONOMY_HTTP_TIMEOUT: Duration = Duration::from_secs(20);

pub const DEFAULT_LANGUAGE: &str = "en";

/// Languages the ReliefWeb taxonomies are maintained in.
pub const DEFAULT_LANGUAGES: &[&str] = &["en", "fr", "es"];

/// Query used to warm up the scorer at startup.
pub const WARMUP_QUERY: &str = "This is a warm-up query to initialize the model.";

pub const RANKER_STATUS_HEADER: &str = "X-Ranker-Status";
pub const RANKER_STATUS_HEALTHY: &str = "healthy";
pub const RANKER_STATUS_READY: &str = "ready";
pub const RANKER_STATUS_NOT_READY: &str = "not_ready";
