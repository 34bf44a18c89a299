use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Deserialization failed: {0}")]
    DeserializeFailed(String),
}

impl FetchError {
    /// True when the failure happened before any response arrived
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::RequestFailed(_) | FetchError::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// HTTP GET capability returning a JSON document
///
/// The box-office core only ever needs this one verb. Implementations
/// decide everything about the wire: timeouts, pooling, TLS.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    /// Fetch `url` and decode the body as JSON
    async fn get_json(&self, url: &str) -> Result<Value>;
}
