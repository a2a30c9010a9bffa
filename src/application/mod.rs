// Application layer - Proxy and dashboard use cases
pub mod dashboard_client;
pub mod reading_feed;
pub mod sensor_proxy;
pub mod sensor_source;
