//! Unsplash photo search client

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::ImageSearch;
use crate::error::{AdvisorError, Result};

/// Unsplash API configuration
#[derive(Clone, Debug)]
pub struct UnsplashConfig {
    pub base_url: String,

    /// Access key, sent as `client_id`
    pub access_key: Option<String>,

    /// Results per search
    pub per_page: u8,

    pub timeout_secs: u64,
}

impl Default for UnsplashConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.unsplash.com".into(),
            access_key: None,
            per_page: 3,
            timeout_secs: 10,
        }
    }
}

/// `GET /search/photos` response body
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
pub struct Photo {
    pub urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
pub struct PhotoUrls {
    pub regular: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

pub struct UnsplashClient {
    client: reqwest::Client,
    config: UnsplashConfig,
}

impl UnsplashClient {
    pub fn from_config(config: UnsplashConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AdvisorError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn error_message(body: &str) -> String {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .filter(|b| !b.errors.is_empty())
            .map_or_else(|| body.trim().to_string(), |b| b.errors.join("; "))
    }
}

#[async_trait]
impl ImageSearch for UnsplashClient {
    async fn search(&self, query: &str) -> Result<Vec<String>> {
        let url = format!("{}/search/photos", self.config.base_url.trim_end_matches('/'));
        let per_page = self.config.per_page.to_string();

        let mut params = vec![("query", query), ("per_page", per_page.as_str())];
        if let Some(key) = &self.config.access_key {
            params.push(("client_id", key.as_str()));
        }

        let response = self.client.get(&url).query(&params).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AdvisorError::Status {
                status: status.as_u16(),
                message: Self::error_message(&body),
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)?;
        let urls: Vec<String> = parsed.results.into_iter().map(|p| p.urls.regular).collect();

        tracing::debug!(query = %query, count = urls.len(), "Unsplash search complete");
        Ok(urls)
    }

    fn is_configured(&self) -> bool {
        self.config.access_key.is_some()
    }

    fn name(&self) -> &str {
        "Unsplash"
    }
}
