pub mod routes;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::pipeline::SalesPipeline;

/// Application state shared across handlers; read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SalesPipeline>,
}

pub fn build_router(pipeline: Arc<SalesPipeline>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/sales/predict", post(routes::predict))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { pipeline })
}
