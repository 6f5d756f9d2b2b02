//! Provider-adapter error types (§4.1).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("ticker not found: {0}")]
    NotFound(String),

    #[error("rate limited by upstream provider")]
    RateLimit,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("upstream schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("json parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("provider misconfigured: {0}")]
    Configuration(String),
}
