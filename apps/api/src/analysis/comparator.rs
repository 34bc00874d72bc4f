//! Comparator — partitions job-description keywords into matched and missing
//! relative to a resume keyword set.
//!
//! Matching is exact on the normalized form. There is no fuzzy or synonym
//! matching: "developer" only matches "development" if normalization folds the
//! two together, which it does not.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::keywords::KeywordExtractor;
use crate::analysis::normalizer::normalize;

/// Result of a comparison. Both lists keep the job keywords' extraction order,
/// are disjoint, and together cover every job keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub matches: Vec<String>,
    pub missing: Vec<String>,
}

pub struct Comparator {
    extractor: Arc<KeywordExtractor>,
}

impl Comparator {
    pub fn new(extractor: Arc<KeywordExtractor>) -> Self {
        Self { extractor }
    }

    /// Extracts keywords from `job_description` and partitions them.
    pub fn compare(&self, resume_keywords: &[String], job_description: &str) -> ComparisonResult {
        let job_keywords = self.extractor.extract(job_description);
        partition(resume_keywords, &job_keywords)
    }
}

/// Partitions `job_keywords` (in order) by membership of their normalized
/// form in the normalized resume set. Terms normalizing to the empty string
/// are ignored on both sides.
pub fn partition<R, J>(resume_keywords: &[R], job_keywords: &[J]) -> ComparisonResult
where
    R: AsRef<str>,
    J: AsRef<str>,
{
    let resume_set: HashSet<String> = resume_keywords
        .iter()
        .map(|k| normalize(k.as_ref()))
        .filter(|k| !k.is_empty())
        .collect();

    let mut result = ComparisonResult::default();
    let mut seen = HashSet::new();
    for keyword in job_keywords {
        let keyword = keyword.as_ref();
        let normalized = normalize(keyword);
        if normalized.is_empty() || !seen.insert(normalized.clone()) {
            continue;
        }
        if resume_set.contains(&normalized) {
            result.matches.push(keyword.trim().to_string());
        } else {
            result.missing.push(keyword.trim().to_string());
        }
    }
    result
}
