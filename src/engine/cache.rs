//! Statement/result cachers
//!
//! The engine keeps one named cacher per table. What is stored is up to the
//! query layer; values are kept as JSON.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use serde_json::Value;

pub trait Cacher: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn put(&self, key: &str, value: Value);
    fn remove(&self, key: &str);
    fn clear(&self);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Entries {
    values: HashMap<String, Value>,
    order: VecDeque<String>,
}

/// Bounded in-memory cacher; evicts the oldest insert when full
pub struct MemoryCacher {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl MemoryCacher {
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(Entries {
                values: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }
}

impl Default for MemoryCacher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl Cacher for MemoryCacher {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.lock().values.get(key).cloned()
    }

    fn put(&self, key: &str, value: Value) {
        let mut entries = self.entries.lock();
        if entries.values.insert(key.to_string(), value).is_some() {
            return;
        }
        entries.order.push_back(key.to_string());
        while entries.values.len() > self.capacity {
            match entries.order.pop_front() {
                Some(oldest) => {
                    entries.values.remove(&oldest);
                }
                None => break,
            }
        }
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock();
        if entries.values.remove(key).is_some() {
            entries.order.retain(|k| k != key);
        }
    }

    fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.values.clear();
        entries.order.clear();
    }

    fn len(&self) -> usize {
        self.entries.lock().values.len()
    }
}
