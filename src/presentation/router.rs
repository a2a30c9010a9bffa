// Route table and middleware stack
use crate::presentation::app_state::AppState;
use crate::presentation::cors::{allow_any_origin, preflight};
use crate::presentation::handlers::{
    dashboard_view, get_reading, health_check, not_found, post_reading,
};
use axum::{Router, middleware, routing::get};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

pub fn build_router(state: Arc<AppState>, reading_route: &str) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(dashboard_view))
        .route(reading_route, get(get_reading).post(post_reading))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(preflight))
        .layer(allow_any_origin())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}
