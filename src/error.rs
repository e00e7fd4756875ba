use thiserror::Error;

/// Why a page could not be fetched. Logged by the fetcher, never returned past it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("cache value encoding error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("cache connection lock poisoned")]
    Poisoned,
}
