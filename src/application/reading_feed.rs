// Feed trait the dashboard client polls
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientFetchError {
    #[error("{0}")]
    Network(String),
    #[error("Proxy responded with status {0}")]
    Status(String),
    #[error("{0}")]
    Parse(String),
    #[error("Invalid data format")]
    InvalidFormat,
}

#[async_trait]
pub trait ReadingFeed: Send + Sync {
    /// Fetch the proxy's current reading body
    async fn poll(&self) -> Result<Value, ClientFetchError>;
}
