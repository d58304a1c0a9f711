use crate::payout::{RateError, Rates};
use std::path::Path;
use tokio::fs;
use tracing::{error, warn};

/// Reads the rates file. A missing file is an empty book; an unreadable or
/// corrupt one is logged and also treated as empty.
pub async fn load_rates(path: &Path) -> Rates {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<Rates>(&bytes) {
            Ok(rates) => sanitize(rates),
            Err(err) => {
                warn!("ignoring malformed rates file {}: {err}", path.display());
                Rates::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Rates::default(),
        Err(err) => {
            error!("failed to read rates file {}: {err}", path.display());
            Rates::default()
        }
    }
}

fn sanitize(rates: Rates) -> Rates {
    rates
        .into_iter()
        .filter(|(author, rate)| {
            let keep = rate.is_finite() && *rate >= 0.0;
            if !keep {
                warn!(author = author.as_str(), "dropping stored rate {rate}");
            }
            keep
        })
        .collect()
}

pub async fn persist_rates(path: &Path, rates: &Rates) -> Result<(), RateError> {
    let payload = serde_json::to_vec_pretty(rates)?;
    if let Err(err) = fs::write(path, payload).await {
        error!("failed to write rates file {}: {err}", path.display());
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let rates = load_rates(&dir.path().join("absent.json")).await;
        assert!(rates.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.json");
        for body in ["{not json", "[1, 2]", r#"{"Ann": "ten"}"#, ""] {
            fs::write(&path, body).await.unwrap();
            assert!(load_rates(&path).await.is_empty(), "{body}");
        }
    }

    #[tokio::test]
    async fn negative_entries_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.json");
        fs::write(&path, r#"{"Ann": 5, "Bob": -3}"#).await.unwrap();

        let rates = load_rates(&path).await;
        assert_eq!(rates, Rates::from([("Ann".to_string(), 5.0)]));
    }

    #[tokio::test]
    async fn persisted_rates_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.json");
        let rates = Rates::from([("Ann".to_string(), 10.0), ("Unknown".to_string(), 1.5)]);

        persist_rates(&path, &rates).await.unwrap();
        assert_eq!(load_rates(&path).await, rates);
    }
}
