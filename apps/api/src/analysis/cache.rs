//! Content-addressed cache of extraction results.
//!
//! Keys are the SHA-256 of the uploaded bytes plus the declared format. Entries
//! are immutable `Arc`s published under the write lock with first-writer-wins,
//! so two concurrent uploads of the same file both observe one entry. Eviction
//! is FIFO once `capacity` entries are held. Caching never changes what a
//! caller observes, only how often documents are decoded.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

use sha2::{Digest, Sha256};

use crate::analysis::decoder::DocumentFormat;
use crate::analysis::service::ExtractionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    digest: [u8; 32],
    format: DocumentFormat,
}

impl CacheKey {
    pub fn new(bytes: &[u8], format: DocumentFormat) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self {
            digest: hasher.finalize().into(),
            format,
        }
    }
}

#[derive(Default)]
struct Entries {
    map: HashMap<CacheKey, Arc<ExtractionResult>>,
    order: VecDeque<CacheKey>,
}

pub struct ExtractionCache {
    capacity: usize,
    entries: RwLock<Entries>,
}

impl ExtractionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(Entries::default()),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<ExtractionResult>> {
        // Entries are never mutated in place, so a poisoned lock still holds valid data.
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.map.get(key).cloned()
    }

    /// Publishes `result` unless another caller got there first, and returns
    /// whichever entry is now cached.
    pub fn insert(&self, key: CacheKey, result: ExtractionResult) -> Arc<ExtractionResult> {
        if self.capacity == 0 {
            return Arc::new(result);
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.map.get(&key) {
            return Arc::clone(existing);
        }
        while entries.order.len() >= self.capacity {
            match entries.order.pop_front() {
                Some(oldest) => {
                    entries.map.remove(&oldest);
                }
                None => break,
            }
        }
        let published = Arc::new(result);
        entries.map.insert(key, Arc::clone(&published));
        entries.order.push_back(key);
        published
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .map
            .len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
