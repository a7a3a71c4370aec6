//! LRU cache of resolved record vectors, keyed by record name.
//!
//! Saves repeated capability round-trips when the same concepts are
//! clustered again. Default: 4096 entries, 1-hour TTL.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use ndarray::Array1;
use parking_lot::Mutex;

struct CacheEntry {
    vector: Array1<f32>,
    inserted_at: Instant,
}

struct CacheInner {
    entries: HashMap<String, CacheEntry>,
    /// Least recently used at the front.
    order: VecDeque<String>,
    max_size: usize,
    ttl: Duration,
}

impl CacheInner {
    fn touch(&mut self, name: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == name) {
            if let Some(key) = self.order.remove(pos) {
                self.order.push_back(key);
            }
        }
    }

    fn forget(&mut self, name: &str) {
        self.entries.remove(name);
        self.order.retain(|k| k != name);
    }
}

/// Thread-safe vector cache shared across clustering requests.
pub struct EmbeddingCache {
    inner: Mutex<CacheInner>,
}

impl EmbeddingCache {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::with_capacity(max_size),
                order: VecDeque::with_capacity(max_size),
                max_size: max_size.max(1),
                ttl,
            }),
        }
    }

    /// Cached vector for `name`; expired entries are dropped and miss.
    pub fn get(&self, name: &str) -> Option<Array1<f32>> {
        let mut inner = self.inner.lock();
        let ttl = inner.ttl;
        let (vector, expired) = match inner.entries.get(name) {
            Some(entry) => (entry.vector.clone(), entry.inserted_at.elapsed() >= ttl),
            None => return None,
        };
        if expired {
            inner.forget(name);
            return None;
        }
        inner.touch(name);
        Some(vector)
    }

    pub fn put(&self, name: String, vector: Array1<f32>) {
        let mut inner = self.inner.lock();
        if inner.entries.contains_key(&name) {
            inner.touch(&name);
        } else {
            while inner.entries.len() >= inner.max_size {
                match inner.order.pop_front() {
                    Some(oldest) => {
                        inner.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
            inner.order.push_back(name.clone());
        }
        inner.entries.insert(
            name,
            CacheEntry {
                vector,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new(4096, Duration::from_secs(3600))
    }
}
