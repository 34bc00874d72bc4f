use axum::Json;
use serde_json::{json, Value};

/// GET /
/// Greeting kept for clients that probe the service root.
pub async fn index_handler() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Resume Analyzer API!"
    }))
}

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-analyzer"
    }))
}
