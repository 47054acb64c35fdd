// ── Suggestion cache ──
//
// Concurrent TTL cache for autocomplete results, shared by every spawned
// lookup task through `MapsService`. Keyed by the exact input text.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use crate::model::Suggestion;

#[derive(Debug)]
struct Entry {
    stored_at: Instant,
    items: Arc<Vec<Suggestion>>,
}

/// Autocomplete results keyed by input text, expiring after a fixed lifetime.
#[derive(Debug)]
pub struct SuggestionCache {
    entries: DashMap<String, Entry>,
    ttl: Duration,
}

impl SuggestionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// A fresh entry for `input`. Expired entries are evicted on lookup.
    pub fn get(&self, input: &str) -> Option<Arc<Vec<Suggestion>>> {
        let fresh = {
            let entry = self.entries.get(input)?;
            (entry.stored_at.elapsed() < self.ttl).then(|| Arc::clone(&entry.items))
        };
        if fresh.is_none() {
            self.entries.remove(input);
        }
        fresh
    }

    pub fn insert(&self, input: &str, items: Arc<Vec<Suggestion>>) {
        self.entries.insert(
            input.to_owned(),
            Entry {
                stored_at: Instant::now(),
                items,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
