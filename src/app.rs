use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/news", get(handlers::news_proxy))
        .route("/api/articles", get(handlers::get_articles))
        .route("/api/charts", get(handlers::get_chart))
        .route("/api/payouts", get(handlers::get_payouts))
        .route("/api/payouts/rates", get(handlers::get_rates).put(handlers::put_rate))
        .route("/api/theme", get(handlers::get_theme).put(handlers::put_theme))
        .route("/export/articles/:format", get(handlers::export_articles))
        .route("/export/payouts/:format", get(handlers::export_payouts))
        .with_state(state)
}
