use anyhow::{Context, bail};
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

pub const DEFAULT_UPSTREAM_URL: &str = "http://192.168.0.106";

/// Paths the router owns regardless of `server.route`
pub const RESERVED_ROUTES: [&str; 2] = ["/healthz", "/dashboard"];

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub proxy: ProxySettings,
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
    pub route: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// `GET` fetches from the upstream sensor
    Poll,
    /// the sensor pushes via `POST`; `GET` serves the cache
    Push,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProxySettings {
    pub mode: SourceMode,
    pub upstream_url: String,
    pub timeout_ms: u64,
    pub default_sampling_rate: f64,
    pub default_sample_interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    pub enabled: bool,
    /// Defaults to this server's own reading route
    pub feed_url: Option<String>,
    pub poll_interval_ms: u64,
}

fn with_defaults() -> anyhow::Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("server.route", "/")?
        .set_default("proxy.mode", "poll")?
        .set_default("proxy.upstream_url", DEFAULT_UPSTREAM_URL)?
        .set_default("proxy.timeout_ms", 10_000)?
        .set_default("proxy.default_sampling_rate", 1.0)?
        .set_default("proxy.default_sample_interval_ms", 1000)?
        .set_default("dashboard.enabled", true)?
        .set_default("dashboard.poll_interval_ms", 1000)?)
}

/// Defaults, then `config/sand-monitor.*` if present, then `SAND_MONITOR__*`
/// variables, then `SENSOR_API_URL` for the upstream sensor.
pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = with_defaults()?
        .add_source(File::with_name("config/sand-monitor").required(false))
        .add_source(
            Environment::with_prefix("SAND_MONITOR")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("proxy.upstream_url", std::env::var("SENSOR_API_URL").ok())?
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

impl AppConfig {
    /// Reject values that would otherwise panic later inside the router or the poller.
    pub fn validate(&self) -> anyhow::Result<()> {
        let route = &self.server.route;
        if !route.starts_with('/') {
            bail!("server.route must start with '/' (got {:?})", route);
        }
        if RESERVED_ROUTES.contains(&route.as_str()) {
            bail!("server.route {:?} clashes with a built-in route", route);
        }
        self.bind_addr()?;
        if self.proxy.timeout_ms == 0 {
            bail!("proxy.timeout_ms must be greater than zero");
        }
        if self.dashboard.poll_interval_ms == 0 {
            bail!("dashboard.poll_interval_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        self.server
            .bind
            .parse()
            .with_context(|| format!("server.bind {:?} is not a socket address", self.server.bind))
    }

    /// URL the built-in dashboard polls: `dashboard.feed_url` if set, otherwise
    /// this server's reading route, reached over loopback when bound to all interfaces.
    pub fn dashboard_feed_url(&self) -> anyhow::Result<String> {
        if let Some(url) = &self.dashboard.feed_url {
            return Ok(url.clone());
        }
        let mut addr = self.bind_addr()?;
        if addr.ip().is_unspecified() {
            let loopback: IpAddr = match addr {
                SocketAddr::V4(_) => Ipv4Addr::LOCALHOST.into(),
                SocketAddr::V6(_) => Ipv6Addr::LOCALHOST.into(),
            };
            addr.set_ip(loopback);
        }
        Ok(format!("http://{}{}", addr, self.server.route))
    }
}
