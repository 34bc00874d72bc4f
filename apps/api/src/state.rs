use std::sync::Arc;

use crate::analysis::AnalysisService;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Engine shared across requests. Immutable after startup, so no locking
    /// beyond the extraction cache's own.
    pub analysis: Arc<AnalysisService>,
}
