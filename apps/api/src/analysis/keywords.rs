//! Keyword Extractor — derives a bounded, deduplicated keyword list from plain text.
//!
//! Algorithm:
//! 1. Split text into segments at line breaks, sentence punctuation and brackets.
//!    Phrases never span a segment boundary.
//! 2. Scan each segment greedily, longest phrase first. A multi-word phrase is
//!    accepted when it is a curated vocabulary phrase, or when it repeats at least
//!    `min_phrase_frequency` times with meaningful words at both edges. An
//!    accepted phrase consumes its words.
//! 3. Remaining single words are kept unless they are filler, carry no letter,
//!    or are too short (acronym allow-list excepted).
//! 4. Dedupe on the normalized form, keep the first display form, and cap the
//!    list at `max_keywords` by frequency (ties → earlier first occurrence).
//!
//! Output is in first-seen order. Hash maps are only used for lookups, so the
//! result never depends on hash iteration order.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::normalizer::{normalize_word, strip_boundary};
use crate::analysis::vocabulary::Vocabulary;

/// Splits text where a phrase must not continue. Punctuation only counts when
/// followed by whitespace, so `node.js`, `3.5` and `ci/cd` stay whole.
const SEGMENT_BOUNDARY_PATTERN: &str = r#"[\r\n]+|[.,;:!?…]+(?:\s+|$)|[()\[\]{}"“”•|]"#;

/// Emails and links are contact details, not skills.
const CONTACT_PATTERN: &str = r"@|^(?:https?://|www\.)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionLimits {
    /// Upper bound on returned keywords.
    pub max_keywords: usize,
    /// Longest multi-word phrase considered.
    pub max_phrase_words: usize,
    /// Single words shorter than this are dropped unless allow-listed.
    pub min_word_chars: usize,
    /// Occurrences needed before an uncurated phrase becomes a keyword.
    pub min_phrase_frequency: usize,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            max_keywords: 100,
            max_phrase_words: 3,
            min_word_chars: 2,
            min_phrase_frequency: 2,
        }
    }
}

/// A whitespace-delimited word with its display and normalized forms.
#[derive(Debug)]
struct Word<'t> {
    display: &'t str,
    normalized: String,
}

/// A distinct keyword in first-seen position.
#[derive(Debug)]
struct Term {
    display: String,
    frequency: usize,
}

pub struct KeywordExtractor {
    vocabulary: Arc<Vocabulary>,
    limits: ExtractionLimits,
    segment_boundary: Regex,
    contact: Regex,
}

impl KeywordExtractor {
    pub fn new(vocabulary: Arc<Vocabulary>, limits: ExtractionLimits) -> Self {
        Self {
            vocabulary,
            limits,
            segment_boundary: Regex::new(SEGMENT_BOUNDARY_PATTERN)
                .expect("Invalid segment boundary regex"),
            contact: Regex::new(CONTACT_PATTERN).expect("Invalid contact regex"),
        }
    }

    /// Extracts unique keywords from `text` in first-seen order.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let segments = self.segment(text);
        let repeated = self.count_phrases(&segments);

        let mut terms: Vec<Term> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut record = |display: String, normalized: String| match positions.entry(normalized) {
            Entry::Occupied(slot) => terms[*slot.get()].frequency += 1,
            Entry::Vacant(slot) => {
                slot.insert(terms.len());
                terms.push(Term {
                    display,
                    frequency: 1,
                });
            }
        };

        for segment in &segments {
            let mut i = 0;
            while i < segment.len() {
                if let Some(len) = self.phrase_at(segment, i, &repeated) {
                    let words = &segment[i..i + len];
                    record(join_display(words), join_normalized(words));
                    i += len;
                    continue;
                }
                let word = &segment[i];
                if self.is_keyword_word(word) {
                    record(word.display.to_string(), word.normalized.clone());
                }
                i += 1;
            }
        }

        self.select(terms)
    }

    fn segment<'t>(&self, text: &'t str) -> Vec<Vec<Word<'t>>> {
        let mut segments = Vec::new();
        for chunk in self.segment_boundary.split(text) {
            let mut current = Vec::new();
            for raw in chunk.split_whitespace() {
                match normalize_word(raw) {
                    Some(normalized) => current.push(Word {
                        display: strip_boundary(raw),
                        normalized,
                    }),
                    // A stray dash or bullet separates phrases like punctuation does.
                    None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                    None => {}
                }
            }
            if !current.is_empty() {
                segments.push(current);
            }
        }
        segments
    }

    /// Counts every uncurated phrase whose edges are meaningful words.
    fn count_phrases(&self, segments: &[Vec<Word<'_>>]) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for segment in segments {
            for start in 0..segment.len() {
                for len in 2..=self.limits.max_phrase_words {
                    let Some(words) = segment.get(start..start + len) else {
                        break;
                    };
                    if self.has_meaningful_edges(words) {
                        *counts.entry(join_normalized(words)).or_insert(0) += 1;
                    }
                }
            }
        }
        counts
    }

    /// Length of the longest acceptable phrase starting at `start`, if any.
    fn phrase_at(
        &self,
        segment: &[Word<'_>],
        start: usize,
        repeated: &HashMap<String, usize>,
    ) -> Option<usize> {
        let longest = self.limits.max_phrase_words.min(segment.len() - start);
        (2..=longest).rev().find(|&len| {
            let words = &segment[start..start + len];
            let normalized = join_normalized(words);
            if self.vocabulary.is_phrase(&normalized) {
                return true;
            }
            self.has_meaningful_edges(words)
                && repeated.get(&normalized).copied().unwrap_or(0)
                    >= self.limits.min_phrase_frequency
        })
    }

    fn has_meaningful_edges(&self, words: &[Word<'_>]) -> bool {
        match (words.first(), words.last()) {
            (Some(first), Some(last)) => self.is_keyword_word(first) && self.is_keyword_word(last),
            _ => false,
        }
    }

    fn is_keyword_word(&self, word: &Word<'_>) -> bool {
        let normalized = word.normalized.as_str();
        if self.vocabulary.is_filler(normalized) {
            return false;
        }
        if !normalized.chars().any(char::is_alphabetic) {
            return false;
        }
        if self.contact.is_match(normalized) {
            return false;
        }
        normalized.chars().count() >= self.limits.min_word_chars
            || self.vocabulary.is_acronym(normalized)
    }

    /// Applies the keyword cap, then restores first-seen order.
    fn select(&self, terms: Vec<Term>) -> Vec<String> {
        if terms.len() <= self.limits.max_keywords {
            return terms.into_iter().map(|t| t.display).collect();
        }

        let mut ranked: Vec<usize> = (0..terms.len()).collect();
        // Stable sort keeps earlier terms ahead on equal frequency.
        ranked.sort_by(|&a, &b| terms[b].frequency.cmp(&terms[a].frequency));
        ranked.truncate(self.limits.max_keywords);
        ranked.sort_unstable();

        let mut keep = vec![false; terms.len()];
        for idx in ranked {
            keep[idx] = true;
        }
        terms
            .into_iter()
            .zip(keep)
            .filter_map(|(term, kept)| kept.then_some(term.display))
            .collect()
    }
}

fn join_display(words: &[Word<'_>]) -> String {
    words.iter().map(|w| w.display).collect::<Vec<_>>().join(" ")
}

fn join_normalized(words: &[Word<'_>]) -> String {
    words
        .iter()
        .map(|w| w.normalized.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
