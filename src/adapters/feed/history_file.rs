//! History provider backed by a JSON file
//!
//! ```json
//! {
//!   "XOM": [{"timestamp": "2019-01-02T15:00:00Z", "price": 80.1}, ...],
//!   "BP":  [{"timestamp": "2019-01-02T15:00:00Z", "price": 38.4}, ...]
//! }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::Instrument;
use crate::ports::market_data::{HistoryPort, MarketDataError, PriceHistory};

#[derive(Debug, Clone)]
pub struct JsonHistoryFile {
    path: PathBuf,
}

impl JsonHistoryFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HistoryPort for JsonHistoryFile {
    async fn fetch_history(
        &self,
        instruments: &[Instrument],
        count: usize,
    ) -> Result<PriceHistory, MarketDataError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let mut all: PriceHistory = serde_json::from_str(&content)?;

        let mut history = PriceHistory::with_capacity(instruments.len());
        for instrument in instruments {
            let Some(mut series) = all.remove(instrument) else {
                tracing::warn!("No history for {} in {}", instrument, self.path.display());
                continue;
            };
            series.sort_by_key(|bar| bar.timestamp);
            let skip = series.len().saturating_sub(count);
            series.drain(..skip);
            tracing::debug!("Loaded {} bars for {} from {}", series.len(), instrument, self.path.display());
            history.insert(instrument.clone(), series);
        }
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HISTORY: &str = r#"{
        "XOM": [
            {"timestamp": "2019-01-02T17:00:00Z", "price": 81.0},
            {"timestamp": "2019-01-02T15:00:00Z", "price": 79.0},
            {"timestamp": "2019-01-02T16:00:00Z", "price": 80.0}
        ],
        "BP": [
            {"timestamp": "2019-01-02T15:00:00Z", "price": 38.0}
        ]
    }"#;

    #[tokio::test]
    async fn test_reads_sorted_tail() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(HISTORY.as_bytes()).unwrap();

        let provider = JsonHistoryFile::new(file.path());
        let history = provider
            .fetch_history(&["XOM".into(), "BP".into(), "CVX".into()], 2)
            .await
            .unwrap();

        let xom = &history[&Instrument::new("XOM")];
        assert_eq!(xom.iter().map(|b| b.price).collect::<Vec<_>>(), vec![80.0, 81.0]);
        assert_eq!(history[&Instrument::new("BP")].len(), 1);
        assert!(!history.contains_key(&Instrument::new("CVX")));
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let provider = JsonHistoryFile::new("/nonexistent/history.json");
        let result = provider.fetch_history(&["XOM".into()], 10).await;
        assert!(matches!(result, Err(MarketDataError::Io(_))));
    }

    #[tokio::test]
    async fn test_malformed_file_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let result = JsonHistoryFile::new(file.path())
            .fetch_history(&["XOM".into()], 10)
            .await;
        assert!(matches!(result, Err(MarketDataError::ParseError(_))));
    }
}
