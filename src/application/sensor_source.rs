// Upstream sensor trait for the proxy
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Reasons a fresh reading could not be obtained from the physical sensor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpstreamUnavailable {
    #[error("Timeout after {0:?}")]
    Timeout(Duration),
    #[error("Network response was not ok: {0}")]
    Status(String),
    #[error("Network failure: {0}")]
    Network(String),
    #[error("Malformed sensor data: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait SensorSource: Send + Sync {
    /// Where readings come from, for logging
    fn endpoint(&self) -> &str;

    /// Fetch the raw JSON body the sensor currently reports
    async fn fetch_raw(&self) -> Result<Value, UpstreamUnavailable>;
}
