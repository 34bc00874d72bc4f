//! Analysis Service — the two operations the UI client consumes.
//!
//! `extract_from_document`: format dispatch → decode → keyword extraction.
//! `compare`: input validation → comparator.
//!
//! Engine errors propagate unchanged; the service adds only input-size checks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::cache::{CacheKey, ExtractionCache};
use crate::analysis::comparator::{Comparator, ComparisonResult};
use crate::analysis::decoder::DocumentFormat;
use crate::analysis::error::AnalysisError;
use crate::analysis::keywords::{ExtractionLimits, KeywordExtractor};
use crate::analysis::vocabulary::Vocabulary;

/// Full decoded text plus its keywords. `text` is never truncated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub text: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceLimits {
    pub extraction: ExtractionLimits,
    /// Longest accepted job description, in characters.
    pub max_job_description_chars: usize,
    /// Largest accepted resume keyword list.
    pub max_resume_keywords: usize,
    /// Cached extraction results; 0 disables the cache.
    pub cache_capacity: usize,
}

impl Default for ServiceLimits {
    fn default() -> Self {
        Self {
            extraction: ExtractionLimits::default(),
            max_job_description_chars: 20_000,
            max_resume_keywords: 2_000,
            cache_capacity: 64,
        }
    }
}

pub struct AnalysisService {
    extractor: Arc<KeywordExtractor>,
    comparator: Comparator,
    cache: ExtractionCache,
    limits: ServiceLimits,
}

impl AnalysisService {
    pub fn new(vocabulary: Arc<Vocabulary>, limits: ServiceLimits) -> Self {
        let extractor = Arc::new(KeywordExtractor::new(vocabulary, limits.extraction));
        Self {
            comparator: Comparator::new(Arc::clone(&extractor)),
            extractor,
            cache: ExtractionCache::new(limits.cache_capacity),
            limits,
        }
    }

    /// Decodes a document of the declared MIME type and extracts its keywords.
    pub fn extract_from_document(
        &self,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<Arc<ExtractionResult>, AnalysisError> {
        let format = DocumentFormat::from_mime(mime_type)?;
        self.extract_with_format(bytes, format)
    }

    fn extract_with_format(
        &self,
        bytes: &[u8],
        format: DocumentFormat,
    ) -> Result<Arc<ExtractionResult>, AnalysisError> {
        let key = CacheKey::new(bytes, format);
        if let Some(cached) = self.cache.get(&key) {
            debug!(?format, "Extraction cache hit");
            return Ok(cached);
        }

        let text = format.decode(bytes)?;
        let keywords = self.extractor.extract(&text);
        info!(
            ?format,
            bytes = bytes.len(),
            chars = text.chars().count(),
            keywords = keywords.len(),
            "Extracted resume keywords"
        );
        Ok(self.cache.insert(key, ExtractionResult { text, keywords }))
    }

    /// Compares resume keywords against a job description.
    pub fn compare(
        &self,
        resume_keywords: &[String],
        job_description: &str,
    ) -> Result<ComparisonResult, AnalysisError> {
        let chars = job_description.chars().count();
        if chars > self.limits.max_job_description_chars {
            return Err(AnalysisError::InvalidInput(format!(
                "job_description has {chars} characters; the limit is {}",
                self.limits.max_job_description_chars
            )));
        }
        if resume_keywords.len() > self.limits.max_resume_keywords {
            return Err(AnalysisError::InvalidInput(format!(
                "resume_keywords has {} entries; the limit is {}",
                resume_keywords.len(),
                self.limits.max_resume_keywords
            )));
        }

        let result = self.comparator.compare(resume_keywords, job_description);
        info!(
            matches = result.matches.len(),
            missing = result.missing.len(),
            "Compared resume keywords with job description"
        );
        Ok(result)
    }
}
