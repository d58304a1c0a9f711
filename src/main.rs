use news_dashboard::news::NewsClient;
use news_dashboard::payout::RateBook;
use news_dashboard::{load_rates, router, AppState, Config};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    if let Some(parent) = config.data_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let rates = load_rates(&config.data_path).await;
    info!(count = rates.len(), path = %config.data_path.display(), "loaded payout rates");

    let news = NewsClient::new(&config.news_api_url, &config.news_api_key)?;
    let addr = config.addr;
    let rates = RateBook::new(config.data_path.clone(), rates);
    let state = AppState::new(config, news, rates);

    let loader = state.clone();
    tokio::spawn(async move { loader.load_feed().await });

    let app = router(state);

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
