pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health::index_handler))
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/parse-resume", post(handlers::handle_parse_resume))
        .route("/compare", post(handlers::handle_compare))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
