// Display-ready projection of the dashboard state
use crate::application::dashboard_client::DashboardState;
use crate::domain::history::HistoricalPoint;
use crate::domain::status::Status;
use serde::Serialize;

const PLACEHOLDER: &str = "---";

#[derive(Debug, Serialize)]
pub struct StatusBadge {
    pub label: &'static str,
    pub color: &'static str,
    pub message: &'static str,
}

impl From<Status> for StatusBadge {
    fn from(status: Status) -> Self {
        Self {
            label: status.label(),
            color: status.color(),
            message: status.alert_message(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub sand_level: String,
    pub sampling_rate: String,
    pub sample_interval: String,
    pub status: StatusBadge,
    pub connection: &'static str,
    pub loading: bool,
    pub error: Option<String>,
    pub upstream_error: Option<String>,
    pub history: Vec<HistoricalPoint>,
}

impl From<&DashboardState> for DashboardView {
    fn from(state: &DashboardState) -> Self {
        let current = state.current.as_ref();
        Self {
            sand_level: current
                .map(|r| format!("{:.2}", r.sand_level))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            sampling_rate: current
                .and_then(|r| r.sampling_rate)
                .map(|hz| format!("{:.1}", hz))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            sample_interval: current
                .and_then(|r| r.sample_interval)
                .map(|ms| ms.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            status: state.status.into(),
            connection: if state.connected() {
                "CONNECTED"
            } else {
                "DISCONNECTED"
            },
            loading: state.loading,
            error: state.error.clone(),
            upstream_error: current.and_then(|r| r.upstream_error.clone()),
            history: state.history.to_vec(),
        }
    }
}
