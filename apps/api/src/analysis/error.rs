use thiserror::Error;

/// Failure kinds of the analysis engine.
///
/// Every kind is terminal for the request: extraction and comparison are pure,
/// so repeating a failed call with the same input fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AnalysisError {
    /// Machine-readable kind surfaced to HTTP clients.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            AnalysisError::MalformedDocument(_) => "MALFORMED_DOCUMENT",
            AnalysisError::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}
