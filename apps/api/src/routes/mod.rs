pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Jobs API
        .route("/api/v1/jobs", post(jobs::handle_intake))
        .route("/api/v1/jobs/extract", post(jobs::handle_extract_url))
        .route("/api/v1/jobs/extract-html", post(jobs::handle_extract_html))
        // Analysis API
        .route("/api/v1/analysis", post(analysis::handle_analyze))
        .with_state(state)
}
