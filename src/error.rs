use thiserror::Error;

/// Everything that can go wrong in a scrape run.
///
/// `Timeout`, `Request` and `Export` are recoverable: the pipeline logs them
/// and moves on. The rest abort the run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Ranking fetch failed at the transport level or with a bad status
    #[error("network error fetching {url}: {reason}")]
    Network { url: String, reason: String },

    /// Ranking payload did not have the expected `Data.Data` shape
    #[error("unexpected ranking payload: {0}")]
    Schema(String),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// External extraction process could not be run or exited non-zero
    #[error("extractor process failed: {0}")]
    Subprocess(String),

    #[error("merge failed: {0}")]
    Merge(String),

    #[error("export to {path} failed: {reason}")]
    Export { path: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    /// Whether the pipeline may continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ScrapeError::Timeout { .. } | ScrapeError::Request { .. } | ScrapeError::Export { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
