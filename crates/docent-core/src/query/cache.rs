use std::collections::{HashMap, VecDeque};

/// Cache key for a question: blake3 of the trimmed, lowercased text.
#[must_use]
pub fn fingerprint(question: &str) -> String {
    let normalized = question.trim().to_lowercase();
    blake3::hash(normalized.as_bytes()).to_hex().to_string()
}

/// Bounded map that evicts the oldest inserted key first.
#[derive(Debug, Clone)]
pub struct QueryCache<V> {
    capacity: usize,
    entries: HashMap<String, V>,
    order: VecDeque<String>,
}

impl<V: Clone> QueryCache<V> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Store `value` under `key`. Re-inserting an existing key replaces the
    /// value but keeps its original position in the eviction order.
    pub fn insert(&mut self, key: String, value: V) {
        if self.capacity == 0 {
            return;
        }
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = value;
            return;
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, value);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                tracing::debug!("evicted oldest cached answer");
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
