use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(handlers::health_check))
        .route("/languages", get(handlers::list_languages))
        .route("/generate", post(handlers::generate_program))
        .route("/parse", post(handlers::parse_output))
        .route("/run", post(handlers::run_tests))
        .route("/submissions", post(handlers::proxy_submission))
        .route("/metrics", get(handlers::metrics_endpoint))
}
