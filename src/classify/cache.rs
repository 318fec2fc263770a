//! In-memory cache of classification results.
//!
//! Keyed by `(domain, text)`. Only answered requests are cached; failures
//! are retried on the next run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

#[derive(Default)]
pub struct ClassificationCache {
    entries: RwLock<HashMap<(String, String), Option<String>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl ClassificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(domain: Option<&str>, text: &str) -> (String, String) {
        (domain.unwrap_or("").to_string(), text.to_string())
    }

    /// Cached label for `text`. The outer `None` means not cached.
    pub fn get(&self, domain: Option<&str>, text: &str) -> Option<Option<String>> {
        let entries = self.entries.read().ok()?;
        match entries.get(&Self::key(domain, text)) {
            Some(label) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(label.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn set(&self, domain: Option<&str>, text: &str, label: Option<String>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(Self::key(domain, text), label);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (usize, usize) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyed_by_domain_and_text() {
        let cache = ClassificationCache::new();
        cache.set(Some("insurance"), "Adjudicate", Some("insurance-jargon".to_string()));
        cache.set(None, "Save", None);

        assert_eq!(
            cache.get(Some("insurance"), "Adjudicate"),
            Some(Some("insurance-jargon".to_string()))
        );
        assert_eq!(cache.get(Some("banking"), "Adjudicate"), None);
        assert_eq!(cache.get(None, "Save"), Some(None));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats(), (2, 1));
    }
}
