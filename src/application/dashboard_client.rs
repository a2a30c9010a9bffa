// Dashboard client - Polls the proxy, keeps the trend window and derives status
use crate::application::reading_feed::{ClientFetchError, ReadingFeed};
use crate::domain::history::{HistoricalPoint, HistoryWindow};
use crate::domain::status::Status;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// The proxy's answer as the dashboard understands it.
#[derive(Debug, Clone, PartialEq)]
pub struct PolledReading {
    pub sand_level: f64,
    pub sampling_rate: Option<f64>,
    pub sample_interval: Option<u64>,
    /// Set when the proxy served a cached value because the sensor was unavailable
    pub upstream_error: Option<String>,
}

impl PolledReading {
    /// Reject bodies whose `sandLevel` is missing, not a number, or zero.
    ///
    /// A reading of exactly 0 is treated as no reading at all. The proxy's
    /// initial value is 0, so this keeps the dashboard in its error state
    /// until the sensor has actually reported.
    pub fn parse(body: &Value) -> Result<Self, ClientFetchError> {
        let sand_level = body
            .get("sandLevel")
            .and_then(Value::as_f64)
            .filter(|level| *level != 0.0)
            .ok_or(ClientFetchError::InvalidFormat)?;

        Ok(Self {
            sand_level,
            sampling_rate: body.get("samplingRate").and_then(Value::as_f64),
            sample_interval: body
                .get("sampleInterval")
                .and_then(Value::as_f64)
                .filter(|ms| *ms >= 0.0)
                .map(|ms| ms.round() as u64),
            upstream_error: body.get("error").and_then(Value::as_str).map(String::from),
        })
    }
}

/// What a single tick did to the dashboard state.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Updated { status: Status, previous: Status },
    Failed(String),
    /// A newer tick had already landed, or polling was stopped
    Discarded,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub current: Option<PolledReading>,
    pub history: HistoryWindow,
    pub status: Status,
    pub error: Option<String>,
    pub loading: bool,
    last_applied_seq: u64,
}

impl DashboardState {
    pub fn connected(&self) -> bool {
        self.error.is_none()
    }

    /// Apply the result of tick `seq`; results older than the last applied tick are dropped.
    pub fn apply(
        &mut self,
        seq: u64,
        result: Result<PolledReading, ClientFetchError>,
        time_label: String,
    ) -> TickOutcome {
        if seq <= self.last_applied_seq {
            return TickOutcome::Discarded;
        }
        self.last_applied_seq = seq;

        match result {
            Ok(reading) => {
                let previous = self.status;
                self.status = Status::classify(reading.sand_level);
                self.history
                    .push(HistoricalPoint::new(time_label, reading.sand_level));
                self.current = Some(reading);
                self.error = None;
                TickOutcome::Updated {
                    status: self.status,
                    previous,
                }
            }
            Err(e) => {
                let message = format!("Failed to fetch data from sensor: {}", e);
                self.error = Some(message.clone());
                TickOutcome::Failed(message)
            }
        }
    }
}

/// Marks the client as loading for as long as it is alive.
struct LoadingGuard(Arc<AtomicUsize>);

impl LoadingGuard {
    fn acquire(in_flight: &Arc<AtomicUsize>) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self(in_flight.clone())
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct DashboardClient {
    feed: Arc<dyn ReadingFeed>,
    state: Arc<Mutex<DashboardState>>,
    next_seq: Arc<AtomicU64>,
    in_flight: Arc<AtomicUsize>,
    stopped: Arc<AtomicBool>,
    period: Duration,
}

impl DashboardClient {
    pub fn new(feed: Arc<dyn ReadingFeed>, period: Duration) -> Self {
        Self {
            feed,
            state: Arc::new(Mutex::new(DashboardState::default())),
            next_seq: Arc::new(AtomicU64::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            stopped: Arc::new(AtomicBool::new(false)),
            period,
        }
    }

    /// Copy of the current state with the loading flag filled in.
    pub async fn snapshot(&self) -> DashboardState {
        let mut state = self.state.lock().await.clone();
        state.loading = self.in_flight.load(Ordering::SeqCst) > 0;
        state
    }

    /// Run one poll of the proxy and fold the result into the state.
    pub async fn tick(&self) -> TickOutcome {
        if self.is_stopped() {
            return TickOutcome::Discarded;
        }
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = LoadingGuard::acquire(&self.in_flight);

        let result = match self.feed.poll().await {
            Ok(body) => PolledReading::parse(&body),
            Err(e) => Err(e),
        };
        if self.is_stopped() {
            return TickOutcome::Discarded;
        }

        let time_label = chrono::Local::now().format("%H:%M:%S").to_string();
        let mut state = self.state.lock().await;
        // The poller may have been stopped while this tick waited for the lock
        if self.is_stopped() {
            return TickOutcome::Discarded;
        }
        let outcome = state.apply(seq, result, time_label);

        match &outcome {
            TickOutcome::Updated { status, previous } if status != previous => {
                tracing::info!(
                    from = previous.label(),
                    to = status.label(),
                    "Sand level status changed"
                );
            }
            TickOutcome::Updated { .. } => {
                if let Some(point) = state.history.latest() {
                    tracing::debug!(
                        seq,
                        sand_level = point.sand_level,
                        points = state.history.len(),
                        "Poll applied"
                    );
                }
            }
            TickOutcome::Failed(message) => tracing::warn!(seq, "{}", message),
            TickOutcome::Discarded => tracing::debug!(seq, "Discarded out-of-order poll result"),
        }
        outcome
    }

    /// Start polling on a fixed period. Ticks are spawned independently, so a
    /// slow response may overlap the next one.
    pub fn start(&self) -> PollHandle {
        if self.is_stopped() {
            tracing::warn!("Dashboard polling was already stopped; not restarting");
        } else {
            tracing::info!(period_ms = self.period.as_millis() as u64, "Dashboard polling started");
        }
        let client = self.clone();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(client.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                if client.is_stopped() {
                    break;
                }
                interval.tick().await;
                if client.is_stopped() {
                    break;
                }
                let tick_client = client.clone();
                tokio::spawn(async move {
                    tick_client.tick().await;
                });
            }
        });

        PollHandle {
            task,
            stopped: self.stopped.clone(),
        }
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Owns the polling timer; stopping (or dropping) it makes every pending tick inert.
pub struct PollHandle {
    task: JoinHandle<()>,
    stopped: Arc<AtomicBool>,
}

impl PollHandle {
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.task.abort();
    }
}
