use crate::aggregate::RadiusScale;
use crate::charts::ChartSettings;
use crate::news::DEFAULT_NEWS_URL;
use std::{net::SocketAddr, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub data_path: PathBuf,
    pub news_api_url: String,
    pub news_api_key: String,
    pub font_dir: PathBuf,
    pub font_family: String,
    pub charts: ChartSettings,
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default = |var: &str, default: &str| -> String {
            lookup(var)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let parse_f64 = |var: &str, default: f64| -> Result<f64, ConfigError> {
            match lookup(var) {
                None => Ok(default),
                Some(raw) => raw
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite() && *value >= 0.0)
                    .ok_or_else(|| ConfigError::InvalidEnvVar {
                        var: var.to_string(),
                        reason: format!("expected a non-negative number, got '{raw}'"),
                    }),
            }
        };

        let port = or_default("PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: "PORT".to_string(),
                reason: e.to_string(),
            })?;

        let defaults = RadiusScale::default();
        let radius = RadiusScale {
            scale_factor: parse_f64("CHART_BUBBLE_SCALE", defaults.scale_factor)?,
            min_radius: parse_f64("CHART_BUBBLE_MIN_RADIUS", defaults.min_radius)?,
            max_radius: parse_f64("CHART_BUBBLE_MAX_RADIUS", defaults.max_radius)?,
        };
        if radius.min_radius > radius.max_radius {
            return Err(ConfigError::InvalidEnvVar {
                var: "CHART_BUBBLE_MIN_RADIUS".to_string(),
                reason: format!(
                    "minimum radius {} exceeds maximum {}",
                    radius.min_radius, radius.max_radius
                ),
            });
        }

        Ok(Self {
            addr: SocketAddr::from(([0, 0, 0, 0], port)),
            data_path: PathBuf::from(or_default("APP_DATA_PATH", "data/payout_rates.json")),
            news_api_url: or_default("NEWS_API_URL", DEFAULT_NEWS_URL),
            news_api_key: lookup("NEWS_API_KEY").unwrap_or_default(),
            font_dir: PathBuf::from(or_default("APP_FONT_DIR", "./fonts")),
            font_family: or_default("APP_FONT_FAMILY", "LiberationSans"),
            charts: ChartSettings {
                radius,
                ..ChartSettings::default()
            },
        })
    }
}
