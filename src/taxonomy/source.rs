//! Remote taxonomy catalog access.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::error::TaxonomyError;
use super::types::{Category, TaxonomyEntry};
use crate::constants::{TAXONOMY_FETCH_LIMIT, TAXONOMY_HTTP_TIMEOUT};

/// Provider of taxonomy entry lists.
#[async_trait]
pub trait TaxonomySource: Send + Sync {
    /// Fetches the full entry list for `category` in `language`.
    async fn fetch(
        &self,
        language: &str,
        category: Category,
    ) -> Result<Vec<TaxonomyEntry>, TaxonomyError>;
}

/// ReliefWeb API implementation.
#[derive(Debug, Clone)]
pub struct ReliefWebSource {
    http: HttpClient,
    base_url: String,
    app_name: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    data: Vec<ApiItem>,
}

#[derive(Debug, Deserialize)]
struct ApiItem {
    id: serde_json::Value,
    #[serde(default)]
    fields: ApiFields,
}

#[derive(Debug, Default, Deserialize)]
struct ApiFields {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl ReliefWebSource {
    pub fn new(
        base_url: impl Into<String>,
        app_name: impl Into<String>,
    ) -> Result<Self, TaxonomyError> {
        let http = HttpClient::builder()
            .timeout(TAXONOMY_HTTP_TIMEOUT)
            .build()
            .map_err(|e| TaxonomyError::Client {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            app_name: app_name.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint_url(&self, category: Category) -> String {
        format!("{}/{}", self.base_url, category.endpoint())
    }
}

#[async_trait]
impl TaxonomySource for ReliefWebSource {
    #[instrument(skip(self, category), fields(category = %category))]
    async fn fetch(
        &self,
        language: &str,
        category: Category,
    ) -> Result<Vec<TaxonomyEntry>, TaxonomyError> {
        let url = self.endpoint_url(category);
        let fetch_error = |reason: String| TaxonomyError::Fetch {
            language: language.to_string(),
            category,
            reason,
        };

        let limit = TAXONOMY_FETCH_LIMIT.to_string();
        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT_LANGUAGE, language)
            .query(&[
                ("appname", self.app_name.as_str()),
                ("limit", limit.as_str()),
                ("profile", "full"),
            ])
            .send()
            .await
            .map_err(|e| fetch_error(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("{} returned {}", url, status)));
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| fetch_error(format!("invalid response body: {}", e)))?;

        let entries = entries_from_items(category, body.data);
        debug!(entries = entries.len(), "Fetched taxonomy");
        Ok(entries)
    }
}

fn entries_from_items(category: Category, items: Vec<ApiItem>) -> Vec<TaxonomyEntry> {
    items
        .into_iter()
        .filter_map(|item| {
            let id = match item.id {
                serde_json::Value::String(s) if !s.trim().is_empty() => s,
                serde_json::Value::Number(n) => n.to_string(),
                _ => return None,
            };
            let label = item.fields.name?.trim().to_string();
            if label.is_empty() {
                return None;
            }
            let description = item
                .fields
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty());

            Some(TaxonomyEntry {
                id,
                label,
                description,
                category,
            })
        })
        .collect()
}
