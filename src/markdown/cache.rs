//! Memoization cache for markdown rendering
//!
//! Caches rendered HTML keyed by a hash of the input content.

use std::collections::{HashMap, VecDeque};
use std::hash::{DefaultHasher, Hash, Hasher};

use super::{render_markdown_html, HTML_CACHE_MAX_ENTRIES};

/// Memoization cache for markdown rendering.
///
/// Highlighting dominates render cost, and a transcript re-render would
/// otherwise re-highlight every code block of every reply.
pub struct HtmlCache {
    /// Cache entries keyed by content hash
    entries: HashMap<u64, String>,
    /// Insertion order for eviction (oldest first)
    insertion_order: VecDeque<u64>,
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl Default for HtmlCache {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlCache {
    pub fn new() -> Self {
        Self::with_capacity(HTML_CACHE_MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
            max_entries: max_entries.max(1),
            hits: 0,
            misses: 0,
        }
    }

    fn hash_content(content: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        hasher.finish()
    }

    /// Render markdown with caching.
    pub fn render(&mut self, content: &str) -> String {
        let hash = Self::hash_content(content);

        if let Some(cached) = self.entries.get(&hash) {
            self.hits += 1;
            return cached.clone();
        }

        self.misses += 1;
        let html = render_markdown_html(content);

        while self.entries.len() >= self.max_entries {
            match self.insertion_order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }

        self.entries.insert(hash, html.clone());
        self.insertion_order.push_back(hash);
        html
    }

    /// Cache statistics (hits, misses)
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all entries; statistics are kept
    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_hit_returns_same_html() {
        let mut cache = HtmlCache::new();
        let first = cache.render("**hello**");
        let second = cache.render("**hello**");
        assert_eq!(first, second);
        assert_eq!(cache.stats(), (1, 1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_evicts_oldest() {
        let mut cache = HtmlCache::with_capacity(2);
        cache.render("one");
        cache.render("two");
        cache.render("three");
        assert_eq!(cache.len(), 2);

        // "one" was evicted, so this is a miss
        cache.render("one");
        assert_eq!(cache.stats(), (0, 4));
    }

    #[test]
    fn test_clear_keeps_stats() {
        let mut cache = HtmlCache::new();
        cache.render("x");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), (0, 1));
    }
}
