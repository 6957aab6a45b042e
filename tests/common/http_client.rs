//! Thin HTTP client for the ranker API.

use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ReadyComponents {
    pub http: String,
    pub taxonomy: String,
    pub scorer: String,
    pub scorer_mode: String,
}

#[derive(Debug, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub components: ReadyComponents,
    pub cached_keys: usize,
}

pub struct TestClient {
    base_url: String,
    http: reqwest::Client,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub async fn health(&self) -> reqwest::Result<HealthResponse> {
        self.http
            .get(format!("{}/healthz", self.base_url))
            .send()
            .await?
            .json()
            .await
    }

    pub async fn ready(&self) -> reqwest::Result<(ReadyResponse, StatusCode)> {
        let response = self
            .http
            .get(format!("{}/ready", self.base_url))
            .send()
            .await?;
        let status = response.status();
        Ok((response.json().await?, status))
    }

    pub async fn analyze(
        &self,
        body: serde_json::Value,
    ) -> reqwest::Result<(serde_json::Value, StatusCode)> {
        let response = self
            .http
            .post(format!("{}/v1/analyze", self.base_url))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        Ok((response.json().await?, status))
    }

    pub async fn invalidate(
        &self,
        body: serde_json::Value,
    ) -> reqwest::Result<(serde_json::Value, StatusCode)> {
        let response = self
            .http
            .post(format!("{}/v1/taxonomy/invalidate", self.base_url))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        Ok((response.json().await?, status))
    }
}
