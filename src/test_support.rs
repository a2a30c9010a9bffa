// Scripted in-memory seams for tests
use crate::application::reading_feed::{ClientFetchError, ReadingFeed};
use crate::application::sensor_source::{SensorSource, UpstreamUnavailable};
use async_trait::async_trait;
use axum::{Json, Router, http::StatusCode, routing::get};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub enum SourceStep {
    Reply(Value),
    Fail(UpstreamUnavailable),
    Hang,
}

/// Sensor source that plays back a fixed script, one step per fetch.
pub struct ScriptedSource {
    steps: Mutex<VecDeque<SourceStep>>,
    calls: AtomicUsize,
    hung_request_dropped: Arc<AtomicBool>,
}

struct SetOnDrop(Arc<AtomicBool>);

impl Drop for SetOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl ScriptedSource {
    pub fn new(steps: Vec<SourceStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            calls: AtomicUsize::new(0),
            hung_request_dropped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn unreachable() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn hung_request_dropped(&self) -> bool {
        self.hung_request_dropped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SensorSource for ScriptedSource {
    fn endpoint(&self) -> &str {
        "scripted://sensor"
    }

    async fn fetch_raw(&self) -> Result<Value, UpstreamUnavailable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(SourceStep::Reply(value)) => Ok(value),
            Some(SourceStep::Fail(err)) => Err(err),
            Some(SourceStep::Hang) => {
                let _flag = SetOnDrop(self.hung_request_dropped.clone());
                std::future::pending().await
            }
            None => Err(UpstreamUnavailable::Network("connection refused".to_string())),
        }
    }
}

#[derive(Clone)]
pub enum FeedStep {
    Reply(Value),
    Fail(ClientFetchError),
    Delayed(Duration, Value),
}

/// Reading feed that plays back a script, then repeats `fallback` forever.
pub struct ScriptedFeed {
    steps: Mutex<VecDeque<FeedStep>>,
    fallback: FeedStep,
    calls: AtomicUsize,
}

impl ScriptedFeed {
    pub fn new(steps: Vec<FeedStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            fallback: FeedStep::Fail(ClientFetchError::Network("feed exhausted".to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn constant(value: Value) -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            fallback: FeedStep::Reply(value),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReadingFeed for ScriptedFeed {
    async fn poll(&self) -> Result<Value, ClientFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match step {
            FeedStep::Reply(value) => Ok(value),
            FeedStep::Fail(err) => Err(err),
            FeedStep::Delayed(delay, value) => {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
        }
    }
}

/// Local HTTP server with one route per upstream behaviour the adapters map:
/// `/ok` JSON reading, `/down` 503, `/garbage` a non-JSON 200.
pub async fn serve_fixture() -> SocketAddr {
    let router = Router::new()
        .route(
            "/ok",
            get(|| async { Json(json!({"sandLevel": 321.5, "samplingRate": 2})) }),
        )
        .route(
            "/down",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "sensor offline") }),
        )
        .route("/garbage", get(|| async { "<html>not json</html>" }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
