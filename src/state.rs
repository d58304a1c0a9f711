use crate::config::Config;
use crate::models::Article;
use crate::news::NewsClient;
use crate::payout::RateBook;
use crate::theme::ThemeState;
use chrono::Local;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch news. Please try again later.";

/// The article list as readers see it. Replaced whole when the fetch ends.
#[derive(Debug, Clone, Default)]
pub enum FeedState {
    #[default]
    Loading,
    Ready {
        articles: Arc<Vec<Article>>,
        fetched_at: String,
    },
    Failed {
        message: String,
    },
}

impl FeedState {
    pub fn articles(&self) -> Arc<Vec<Article>> {
        match self {
            FeedState::Ready { articles, .. } => Arc::clone(articles),
            _ => Arc::new(Vec::new()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub news: NewsClient,
    pub feed: Arc<Mutex<FeedState>>,
    pub rates: Arc<RateBook>,
    pub theme: Arc<Mutex<ThemeState>>,
}

impl AppState {
    pub fn new(config: Config, news: NewsClient, rates: RateBook) -> Self {
        Self {
            config: Arc::new(config),
            news,
            feed: Arc::new(Mutex::new(FeedState::Loading)),
            rates: Arc::new(rates),
            theme: Arc::new(Mutex::new(ThemeState::default())),
        }
    }

    pub async fn feed(&self) -> FeedState {
        self.feed.lock().await.clone()
    }

    /// Fetches the article list once. Failure is terminal until restart.
    pub async fn load_feed(&self) {
        let next = match self.news.fetch_articles().await {
            Ok(articles) => {
                info!(count = articles.len(), "article feed ready");
                FeedState::Ready {
                    articles: Arc::new(articles),
                    fetched_at: Local::now().to_rfc3339(),
                }
            }
            Err(err) => {
                error!("article fetch failed: {err}");
                FeedState::Failed {
                    message: FETCH_FAILED_MESSAGE.to_string(),
                }
            }
        };
        *self.feed.lock().await = next;
    }
}
