// HTTP client for the physical sensor endpoint
use crate::application::sensor_source::{SensorSource, UpstreamUnavailable};
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct HttpSensorSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSensorSource {
    pub fn new(url: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl SensorSource for HttpSensorSource {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn fetch_raw(&self) -> Result<Value, UpstreamUnavailable> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| UpstreamUnavailable::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamUnavailable::Status(status.to_string()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| UpstreamUnavailable::Malformed(e.to_string()))
    }
}
