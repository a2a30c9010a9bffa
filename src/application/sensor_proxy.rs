// Sensor proxy - Bounded upstream fetch with last-good-reading fallback
use crate::application::sensor_source::{SensorSource, UpstreamUnavailable};
use crate::domain::reading::{ReadingDefaults, SensorReading, ValidationError};
use crate::infrastructure::config::{ProxySettings, SourceMode};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// A reading plus, when it is stale, why a fresh one could not be had.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchOutcome {
    #[serde(flatten)]
    pub reading: SensorReading,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchOutcome {
    fn live(reading: SensorReading) -> Self {
        Self {
            reading,
            error: None,
        }
    }
}

#[derive(Clone)]
pub struct SensorProxy {
    source: Arc<dyn SensorSource>,
    cache: Arc<RwLock<SensorReading>>,
    defaults: ReadingDefaults,
    timeout: Duration,
    mode: SourceMode,
}

impl SensorProxy {
    pub fn new(source: Arc<dyn SensorSource>, settings: &ProxySettings) -> Self {
        let defaults = ReadingDefaults {
            sampling_rate: settings.default_sampling_rate,
            sample_interval: settings.default_sample_interval_ms,
        };
        Self {
            source,
            cache: Arc::new(RwLock::new(SensorReading::initial(defaults, Utc::now()))),
            defaults,
            timeout: Duration::from_millis(settings.timeout_ms),
            mode: settings.mode,
        }
    }

    /// Answer a `GET`: fetch upstream in poll mode, serve the cache in push mode.
    pub async fn serve_reading(&self) -> FetchOutcome {
        match self.mode {
            SourceMode::Poll => self.fetch_reading().await,
            SourceMode::Push => FetchOutcome::live(self.current().await),
        }
    }

    /// Fetch from the sensor under the timeout. Never fails: on any upstream
    /// problem the cached reading comes back with the reason attached.
    pub async fn fetch_reading(&self) -> FetchOutcome {
        match self.fetch_fresh().await {
            Ok(reading) => {
                *self.cache.write().await = reading;
                tracing::debug!(sand_level = reading.sand_level, "Accepted upstream reading");
                FetchOutcome::live(reading)
            }
            Err(e) => {
                tracing::warn!(
                    endpoint = self.source.endpoint(),
                    "Serving cached reading: {}",
                    e
                );
                FetchOutcome {
                    reading: self.current().await,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Accept a reading pushed by the sensor.
    pub async fn ingest(&self, candidate: &Value) -> Result<SensorReading, ValidationError> {
        let reading = SensorReading::from_candidate(candidate, self.defaults, Utc::now())?;
        *self.cache.write().await = reading;
        tracing::debug!(sand_level = reading.sand_level, "Accepted pushed reading");
        Ok(reading)
    }

    pub async fn current(&self) -> SensorReading {
        *self.cache.read().await
    }

    async fn fetch_fresh(&self) -> Result<SensorReading, UpstreamUnavailable> {
        // Dropping the request future on expiry aborts the underlying connection.
        let raw = tokio::time::timeout(self.timeout, self.source.fetch_raw())
            .await
            .map_err(|_| UpstreamUnavailable::Timeout(self.timeout))??;

        SensorReading::from_candidate(&raw, self.defaults, Utc::now())
            .map_err(|e| UpstreamUnavailable::Malformed(e.to_string()))
    }
}
