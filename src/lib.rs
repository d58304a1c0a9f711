pub mod aggregate;
pub mod app;
pub mod charts;
pub mod config;
pub mod errors;
pub mod export;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod news;
pub mod payout;
pub mod state;
pub mod storage;
pub mod theme;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_rates;
