//! Immutable lookup tables driving keyword selection.
//!
//! Built once at startup (optionally extended from a JSON overrides file) and
//! handed to the extractor behind an `Arc`. Every entry is stored in its
//! normalized form so membership tests agree with comparison-time matching.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::analysis::normalizer::normalize;

/// English function words. Never keywords on their own.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "eg",
    "etc", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here",
    "hers", "herself", "him", "himself", "his", "how", "i", "ie", "if", "in", "into", "is", "it",
    "its", "itself", "just", "me", "more", "most", "must", "my", "myself", "no", "nor", "not",
    "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out",
    "over", "own", "per", "same", "she", "should", "so", "some", "such", "than", "that", "the",
    "their", "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "us", "very", "via", "vs", "was", "we",
    "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with",
    "within", "would", "you", "your", "yours", "yourself", "yourselves",
];

/// Words common to every resume and job posting that carry no skill signal.
const GENERIC_TERMS: &[&str] = &[
    "ability", "able", "candidate", "company", "develop", "developer", "engineer", "environment",
    "excellent", "experience", "experienced", "familiarity", "good", "great", "help", "ideal",
    "including", "job", "join", "knowledge", "like", "looking", "new", "need", "plus",
    "position", "preferred", "proficiency", "proficient", "required", "requirement",
    "responsibility", "role", "seeking", "skill", "strong", "team", "understanding", "use",
    "using", "well", "work", "working", "year",
];

/// Short tokens that are meaningful despite falling under the minimum length.
const ACRONYMS: &[&str] = &[
    "ai", "ml", "ui", "ux", "qa", "ci", "cd", "bi", "db", "js", "ts", "go", "os", "c", "r",
    "c++", "c#", "f#", "3d",
];

/// Curated multi-word skills recognized as a single keyword.
const PHRASES: &[&str] = &[
    "machine learning",
    "deep learning",
    "data science",
    "data analysis",
    "data engineering",
    "natural language processing",
    "computer vision",
    "project management",
    "product management",
    "software development",
    "software engineering",
    "web development",
    "unit testing",
    "integration testing",
    "test automation",
    "continuous integration",
    "continuous delivery",
    "distributed systems",
    "system design",
    "cloud computing",
    "google cloud",
    "google cloud platform",
    "amazon web services",
    "microsoft azure",
    "react native",
    "spring boot",
    "ruby on rails",
    "rest api",
    "restful api",
    "version control",
    "agile methodology",
    "problem solving",
    "public speaking",
    "customer service",
    "technical writing",
];

/// Optional additions loaded from `VOCABULARY_PATH`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VocabularyOverrides {
    pub extra_stop_words: Vec<String>,
    pub extra_generic_terms: Vec<String>,
    pub extra_acronyms: Vec<String>,
    pub extra_phrases: Vec<String>,
}

impl VocabularyOverrides {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read vocabulary file '{}'", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse vocabulary file '{}'", path.display()))
    }
}

#[derive(Debug, Clone)]
pub struct Vocabulary {
    stop_words: HashSet<String>,
    generic_terms: HashSet<String>,
    acronyms: HashSet<String>,
    phrases: HashSet<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::with_overrides(VocabularyOverrides::default())
    }
}

impl Vocabulary {
    pub fn with_overrides(overrides: VocabularyOverrides) -> Self {
        Self {
            stop_words: build_set(STOP_WORDS, &overrides.extra_stop_words),
            generic_terms: build_set(GENERIC_TERMS, &overrides.extra_generic_terms),
            acronyms: build_set(ACRONYMS, &overrides.extra_acronyms),
            phrases: build_set(PHRASES, &overrides.extra_phrases),
        }
    }

    pub fn is_stop_word(&self, normalized: &str) -> bool {
        self.stop_words.contains(normalized)
    }

    pub fn is_generic(&self, normalized: &str) -> bool {
        self.generic_terms.contains(normalized)
    }

    pub fn is_acronym(&self, normalized: &str) -> bool {
        self.acronyms.contains(normalized)
    }

    pub fn is_phrase(&self, normalized: &str) -> bool {
        self.phrases.contains(normalized)
    }

    /// Stop words and generic terms alike carry no signal on their own.
    pub fn is_filler(&self, normalized: &str) -> bool {
        self.is_stop_word(normalized) || self.is_generic(normalized)
    }

    pub fn term_count(&self) -> usize {
        self.stop_words.len() + self.generic_terms.len() + self.acronyms.len() + self.phrases.len()
    }
}

fn build_set(defaults: &[&str], extra: &[String]) -> HashSet<String> {
    defaults
        .iter()
        .copied()
        .chain(extra.iter().map(String::as_str))
        .map(normalize)
        .filter(|term| !term.is_empty())
        .collect()
}
