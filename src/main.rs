// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;
#[cfg(test)]
mod test_support;

use std::{sync::Arc, time::Duration};
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_client::DashboardClient;
use crate::application::sensor_proxy::SensorProxy;
use crate::infrastructure::config::load_config;
use crate::infrastructure::http_reading_feed::HttpReadingFeed;
use crate::infrastructure::http_sensor_source::HttpSensorSource;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_config()?;

    // Upstream sensor (infrastructure layer)
    let source = Arc::new(HttpSensorSource::new(config.proxy.upstream_url.clone())?);

    // Proxy and dashboard client (application layer)
    let proxy = SensorProxy::new(source, &config.proxy);
    let dashboard = if config.dashboard.enabled {
        let feed_url = config.dashboard_feed_url()?;
        tracing::info!(%feed_url, "Dashboard client enabled");
        let feed = Arc::new(HttpReadingFeed::new(feed_url)?);
        Some(DashboardClient::new(
            feed,
            Duration::from_millis(config.dashboard.poll_interval_ms),
        ))
    } else {
        None
    };

    let state = Arc::new(AppState {
        proxy,
        dashboard: dashboard.clone(),
    });
    let router = build_router(state, &config.server.route);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        route = %config.server.route,
        mode = ?config.proxy.mode,
        upstream = %config.proxy.upstream_url,
        "Starting sand-monitor"
    );

    // Poll only once the listener is up so the first ticks can reach the proxy
    let poller = dashboard.as_ref().map(DashboardClient::start);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(poller) = poller {
        poller.stop();
    }
    tracing::info!("sand-monitor stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
