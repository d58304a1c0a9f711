//! Client for the upstream news API.
//!
//! One fixed GET with the API key attached as the `apiKey` query parameter.
//! Any non-2xx answer is a failure, whatever the body says.

use crate::models::{normalize, Article, ArticlesEnvelope};
use reqwest::{Client, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

pub const DEFAULT_NEWS_URL: &str = "https://newsapi.org/v2/top-headlines?country=us";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("news API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected news API payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid news API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Clone)]
pub struct NewsClient {
    client: Client,
    url: Url,
}

impl NewsClient {
    pub fn new(url: &str, api_key: &str) -> Result<Self, FetchError> {
        let mut url = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !api_key.is_empty() {
            url.query_pairs_mut().append_pair("apiKey", api_key);
        }

        let client = Client::builder()
            .user_agent(concat!("news_dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, url })
    }

    /// Upstream body as-is, for the relay endpoint.
    pub async fn fetch_raw(&self) -> Result<Value, FetchError> {
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|body| upstream_message(&body))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            error!(status = status.as_u16(), "news API request failed: {message}");
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn fetch_articles(&self) -> Result<Vec<Article>, FetchError> {
        let body = self.fetch_raw().await?;
        let envelope: ArticlesEnvelope = serde_json::from_value(body)?;
        let articles = normalize(envelope.articles);
        info!(count = articles.len(), "fetched articles");
        Ok(articles)
    }
}

fn upstream_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
