// HTTP client the dashboard uses to poll the proxy
use crate::application::reading_feed::{ClientFetchError, ReadingFeed};
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct HttpReadingFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpReadingFeed {
    pub fn new(url: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl ReadingFeed for HttpReadingFeed {
    async fn poll(&self) -> Result<Value, ClientFetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ClientFetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClientFetchError::Status(response.status().to_string()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ClientFetchError::Parse(e.to_string()))
    }
}
