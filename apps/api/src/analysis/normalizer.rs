//! Term normalization shared by keyword extraction and comparison.
//!
//! Extraction dedupes on the normalized form and comparison matches on it, so
//! both sides go through `normalize` and nothing else. Any divergence between
//! the two breaks matching.

use std::borrow::Cow;

/// Characters stripped from either edge of a word. Interior occurrences are
/// kept (`full-stack`, `node.js`, `ci/cd`). `+` and `#` are deliberately absent
/// so `c++` and `c#` survive.
const BOUNDARY_PUNCTUATION: &[char] = &[
    ',', '.', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '"', '\'', '`', '*', '•', '·',
    '…', '|', '<', '>', '-', '–', '—', '/', '\\', '“', '”', '‘', '’',
];

/// Normalizes a term: lowercase, boundary punctuation stripped per word,
/// whitespace runs collapsed to one space, simple plural folding.
///
/// Total and idempotent; the empty string maps to itself.
pub fn normalize(term: &str) -> String {
    let lowered = term.to_lowercase();
    let words: Vec<Cow<'_, str>> = lowered
        .split_whitespace()
        .map(strip_boundary)
        .filter(|w| !w.is_empty())
        .map(fold_plural)
        .collect();
    words.join(" ")
}

/// Normalizes a single word, returning `None` when nothing survives
/// (pure punctuation).
pub fn normalize_word(word: &str) -> Option<String> {
    let normalized = normalize(word);
    (!normalized.is_empty()).then_some(normalized)
}

/// Strips boundary punctuation without changing case. Used to derive the
/// display form of a word.
pub fn strip_boundary(word: &str) -> &str {
    word.trim_matches(|c: char| BOUNDARY_PUNCTUATION.contains(&c))
}

/// Folds simple English plurals on purely alphabetic ASCII words of 4+ chars.
///
/// - `technologies` → `technology`
/// - `classes` → `class`
/// - `apis` → `api`
///
/// Words ending in `ss`, `us` or `is` (`business`, `status`, `analysis`) are
/// left alone. There is no further stemming: `developer` and `development`
/// remain distinct terms.
fn fold_plural(word: &str) -> Cow<'_, str> {
    if word.len() < 4 || !word.bytes().all(|b| b.is_ascii_lowercase()) {
        return Cow::Borrowed(word);
    }
    if word.len() >= 5 {
        if let Some(stem) = word.strip_suffix("ies") {
            return Cow::Owned(format!("{stem}y"));
        }
    }
    if word.ends_with("sses") {
        return Cow::Borrowed(&word[..word.len() - 2]);
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return Cow::Borrowed(word);
    }
    Cow::Borrowed(word.strip_suffix('s').unwrap_or(word))
}
