mod analysis;
mod config;
mod errors;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::{AnalysisService, Vocabulary, VocabularyOverrides};
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on unparsable env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer API v{}", env!("CARGO_PKG_VERSION"));

    // Built-in vocabulary, optionally extended from VOCABULARY_PATH
    let vocabulary = match &config.vocabulary_path {
        Some(path) => {
            let overrides = VocabularyOverrides::from_file(path)
                .with_context(|| format!("Failed to load vocabulary from {}", path.display()))?;
            Vocabulary::with_overrides(overrides)
        }
        None => Vocabulary::default(),
    };
    info!("Vocabulary loaded ({} terms)", vocabulary.term_count());

    let analysis = Arc::new(AnalysisService::new(Arc::new(vocabulary), config.limits));
    info!(
        "Analysis service ready (max keywords: {}, cache capacity: {})",
        config.limits.extraction.max_keywords, config.limits.cache_capacity
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        analysis,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
