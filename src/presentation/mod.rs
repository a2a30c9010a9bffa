// Presentation layer - HTTP surface
pub mod app_state;
pub mod cors;
pub mod dashboard_view;
pub mod handlers;
pub mod router;
