// Resume analysis: document decoding, keyword extraction, comparison.
// Everything outside handlers is synchronous and pure. Handlers run the
// CPU-bound decode path inside tokio::task::spawn_blocking.

pub mod cache;
pub mod comparator;
pub mod decoder;
pub mod error;
pub mod handlers;
pub mod keywords;
pub mod normalizer;
pub mod service;
pub mod vocabulary;

// Re-export the public API consumed by main, state and errors.
pub use error::AnalysisError;
pub use keywords::ExtractionLimits;
pub use service::{AnalysisService, ServiceLimits};
pub use vocabulary::{Vocabulary, VocabularyOverrides};
