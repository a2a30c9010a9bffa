// Application state for HTTP handlers
use crate::application::dashboard_client::DashboardClient;
use crate::application::sensor_proxy::SensorProxy;

#[derive(Clone)]
pub struct AppState {
    pub proxy: SensorProxy,
    pub dashboard: Option<DashboardClient>,
}
