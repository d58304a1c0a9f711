use crate::aggregate::count_by_author;
use crate::charts::{build_chart, Chart, ChartKind};
use crate::config::Config;
use crate::errors::AppError;
use crate::export::{
    articles_report, payout_report, CsvExporter, ExportError, ExportFormat, Exporter,
    PdfExporter, Report,
};
use crate::filter::{distinct_sorted, filter_articles};
use crate::models::{
    Article, ArticlesResponse, FeedStatus, FilterSpec, PayoutResponse, RateRequest,
};
use crate::payout::{compute_rows, total_payout, Rates};
use crate::state::{AppState, FeedState};
use crate::theme::{platform_preference, ThemeRequest, ThemeState};
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let theme = *state.theme.lock().await;
    Html(render_index(theme.applied))
}

/// Relays the upstream body, or a fixed error body with 500.
pub async fn news_proxy(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    match state.news.fetch_raw().await {
        Ok(body) => Ok(Json(body)),
        Err(err) => {
            error!("news relay failed: {err}");
            Err(AppError::fetch_failed())
        }
    }
}

pub async fn get_articles(
    State(state): State<AppState>,
    Query(filters): Query<FilterSpec>,
) -> Json<ArticlesResponse> {
    let feed = state.feed().await;
    let all = feed.articles();
    let articles = filter_articles(&all, &filters);

    let (status, error, fetched_at) = match feed {
        FeedState::Loading => (FeedStatus::Loading, None, None),
        FeedState::Ready { fetched_at, .. } => (FeedStatus::Ready, None, Some(fetched_at)),
        FeedState::Failed { message } => (FeedStatus::Error, Some(message), None),
    };

    Json(ArticlesResponse {
        status,
        error,
        fetched_at,
        total: articles.len(),
        articles,
        authors: distinct_sorted(&all, |a| a.author.as_str()),
        sources: distinct_sorted(&all, |a| a.source.as_str()),
    })
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    #[serde(default)]
    pub chart: Option<String>,
}

pub async fn get_chart(
    State(state): State<AppState>,
    Query(filters): Query<FilterSpec>,
    Query(selection): Query<ChartQuery>,
) -> Result<Json<Chart>, AppError> {
    let kind = match selection.chart.as_deref() {
        None | Some("") => ChartKind::default(),
        Some(key) => key.parse::<ChartKind>().map_err(AppError::bad_request)?,
    };

    let articles = filtered(&state, &filters).await;
    Ok(Json(build_chart(kind, &articles, &state.config.charts)))
}

pub async fn get_payouts(
    State(state): State<AppState>,
    Query(filters): Query<FilterSpec>,
) -> Json<PayoutResponse> {
    let articles = filtered(&state, &filters).await;
    Json(payouts(&articles, &state.rates.snapshot().await))
}

pub async fn put_rate(
    State(state): State<AppState>,
    Json(payload): Json<RateRequest>,
) -> Result<Json<Rates>, AppError> {
    let rates = state.rates.update(&payload.author, &payload.rate).await?;
    Ok(Json(rates))
}

pub async fn get_rates(State(state): State<AppState>) -> Json<Rates> {
    Json(state.rates.snapshot().await)
}

pub async fn get_theme(State(state): State<AppState>) -> Json<ThemeState> {
    Json(*state.theme.lock().await)
}

pub async fn put_theme(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ThemeRequest>,
) -> Json<ThemeState> {
    let platform = platform_preference(payload.prefers_dark, &headers);
    let mut theme = state.theme.lock().await;
    theme.set_mode(payload.mode, platform);
    info!(mode = ?theme.mode, applied = theme.applied.css_class(), "theme changed");
    Json(*theme)
}

pub async fn export_articles(
    State(state): State<AppState>,
    Path(format): Path<String>,
    Query(filters): Query<FilterSpec>,
) -> Result<Response, AppError> {
    let format = format.parse::<ExportFormat>().map_err(AppError::bad_request)?;
    let articles = filtered(&state, &filters).await;
    download(exporter_for(format, &state.config), articles_report(&articles)).await
}

pub async fn export_payouts(
    State(state): State<AppState>,
    Path(format): Path<String>,
    Query(filters): Query<FilterSpec>,
) -> Result<Response, AppError> {
    let format = format.parse::<ExportFormat>().map_err(AppError::bad_request)?;
    let articles = filtered(&state, &filters).await;
    let payout = payouts(&articles, &state.rates.snapshot().await);
    let report = payout_report(&payout.rows, payout.total_payout);
    download(exporter_for(format, &state.config), report).await
}

async fn filtered(state: &AppState, filters: &FilterSpec) -> Vec<Article> {
    let all = state.feed().await.articles();
    filter_articles(&all, filters)
}

fn payouts(articles: &[Article], rates: &Rates) -> PayoutResponse {
    let rows = compute_rows(&count_by_author(articles), rates);
    PayoutResponse {
        total_payout: total_payout(&rows),
        rows,
    }
}

fn exporter_for(format: ExportFormat, config: &Config) -> Box<dyn Exporter> {
    match format {
        ExportFormat::Csv => Box::new(CsvExporter),
        ExportFormat::Pdf => Box::new(PdfExporter {
            font_dir: config.font_dir.clone(),
            font_family: config.font_family.clone(),
        }),
    }
}

/// Renders off the async workers; PDF output reads font files and lays out
/// every page synchronously.
async fn download(exporter: Box<dyn Exporter>, report: Report) -> Result<Response, AppError> {
    let handle = tokio::task::spawn_blocking(move || {
        let bytes = exporter.export(&report)?;
        let disposition = format!("attachment; filename=\"{}\"", exporter.file_name(&report));
        Ok::<_, ExportError>((exporter.content_type(), disposition, bytes))
    });

    let (content_type, disposition, bytes) = match handle.await {
        Ok(result) => result?,
        Err(err) => {
            error!("export task failed: {err}");
            return Err(AppError::internal(err));
        }
    };
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
