use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "Unknown";

/// Source block of an upstream record.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawSource {
    #[serde(default)]
    pub name: Option<String>,
}

/// Article as delivered by the news API. Every field may be missing or null.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub source: Option<RawSource>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArticlesEnvelope {
    #[serde(default)]
    pub articles: Vec<RawArticle>,
}

/// Normalized article. Identity fields carry "Unknown" instead of being absent,
/// text fields carry an empty string.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub content: String,
    pub author: String,
    pub source: String,
    pub published_at: Option<String>,
    pub url: Option<String>,
}

impl Article {
    /// First ten characters of the timestamp, if there is one.
    pub fn date(&self) -> Option<&str> {
        self.published_at.as_deref().map(date_prefix)
    }

    /// Grouping key for per-day aggregates.
    pub fn date_key(&self) -> &str {
        self.date().unwrap_or(UNKNOWN)
    }
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        Self {
            title: raw.title.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            content: raw.content.unwrap_or_default(),
            author: or_unknown(raw.author),
            source: or_unknown(raw.source.and_then(|source| source.name)),
            published_at: raw.published_at.filter(|value| !value.is_empty()),
            url: raw.url.filter(|value| !value.is_empty()),
        }
    }
}

pub fn normalize(raw: Vec<RawArticle>) -> Vec<Article> {
    raw.into_iter().map(Article::from).collect()
}

fn or_unknown(value: Option<String>) -> String {
    match value {
        Some(value) if !value.is_empty() => value,
        _ => UNKNOWN.to_string(),
    }
}

fn date_prefix(timestamp: &str) -> &str {
    match timestamp.char_indices().nth(10) {
        Some((idx, _)) => &timestamp[..idx],
        None => timestamp,
    }
}

/// Filter fields as they arrive in the query string. Empty means no constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub date_from: String,
    #[serde(default)]
    pub date_to: String,
    #[serde(default, rename = "type")]
    pub source: String,
    #[serde(default)]
    pub keyword: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Serialize)]
pub struct ArticlesResponse {
    pub status: FeedStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
    pub total: usize,
    pub articles: Vec<Article>,
    pub authors: Vec<String>,
    pub sources: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub author: String,
    pub rate: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct PayoutResponse {
    pub rows: Vec<crate::payout::PayoutRow>,
    pub total_payout: f64,
}
