use crate::aggregate::Tally;
use crate::storage::persist_rates;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Author → rate per article.
pub type Rates = BTreeMap<String, f64>;

#[derive(Debug, Error)]
pub enum RateError {
    #[error("invalid payout rate for '{author}': {input}")]
    InvalidRateInput { author: String, input: String },

    #[error("author must not be empty")]
    EmptyAuthor,

    #[error("failed to encode rates: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write rates: {0}")]
    Write(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PayoutRow {
    pub author: String,
    pub count: usize,
    pub rate: f64,
    pub total: f64,
}

/// One row per counted author, in count order. Authors without a stored rate
/// get 0.
pub fn compute_rows(author_counts: &Tally, rates: &Rates) -> Vec<PayoutRow> {
    author_counts
        .iter()
        .map(|(author, count)| {
            let rate = rates.get(author).copied().unwrap_or(0.0);
            PayoutRow {
                author: author.to_string(),
                count,
                rate,
                total: rate * count as f64,
            }
        })
        .collect()
}

pub fn total_payout(rows: &[PayoutRow]) -> f64 {
    rows.iter().map(|row| row.total).sum()
}

/// Coerces a rate entry to a finite, non-negative number. A blank string means
/// the field was cleared and reads as 0.
pub fn parse_rate(input: &Value) -> Option<f64> {
    let value = match input {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                0.0
            } else {
                text.parse::<f64>().ok()?
            }
        }
        _ => return None,
    };

    if !value.is_finite() || value < 0.0 {
        return None;
    }
    // -0.0 is stored as 0
    Some(value + 0.0)
}

/// Returns `rates` with `author` set to the parsed input. The input map is
/// never touched, so a rejected entry leaves the caller's state as it was.
///
/// `author` is stored exactly as given so it matches the key `compute_rows`
/// looks up.
pub fn set_rate(rates: &Rates, author: &str, input: &Value) -> Result<Rates, RateError> {
    if author.trim().is_empty() {
        return Err(RateError::EmptyAuthor);
    }
    let rate = parse_rate(input).ok_or_else(|| RateError::InvalidRateInput {
        author: author.to_string(),
        input: describe(input),
    })?;

    let mut updated = rates.clone();
    updated.insert(author.to_string(), rate);
    Ok(updated)
}

fn describe(input: &Value) -> String {
    match input {
        Value::String(text) => format!("'{text}'"),
        other => other.to_string(),
    }
}

/// Rates shared by every request, backed by the rates file.
pub struct RateBook {
    path: PathBuf,
    rates: Mutex<Rates>,
}

impl RateBook {
    pub fn new(path: PathBuf, rates: Rates) -> Self {
        Self {
            path,
            rates: Mutex::new(rates),
        }
    }

    pub async fn snapshot(&self) -> Rates {
        self.rates.lock().await.clone()
    }

    /// Validates, writes the file, then swaps the in-memory map. Nothing
    /// changes unless all three succeed.
    pub async fn update(&self, author: &str, input: &Value) -> Result<Rates, RateError> {
        let mut rates = self.rates.lock().await;
        let updated = match set_rate(&rates, author, input) {
            Ok(updated) => updated,
            Err(err) => {
                warn!("rejected payout rate: {err}");
                return Err(err);
            }
        };

        persist_rates(&self.path, &updated).await?;
        *rates = updated.clone();
        info!(author, "payout rate updated");
        Ok(updated)
    }
}
