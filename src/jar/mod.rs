//! Cross-test header jar store
//!
//! A suite-wide key/value mapping that lets one test's response header feed
//! a later test's request header: the evaluator writes values for header
//! cases flagged `putInJar`, the merger reads them back for request headers
//! flagged `useFromJar`. Last write wins; ordering is the suite's strictly
//! sequential execution order. The store is owned by the scheduler and
//! passed into the merger/evaluator explicitly so both stay unit-testable.

use std::collections::HashMap;

/// Suite-wide header key/value store, written by response evaluation and
/// read during request preparation of later tests
#[derive(Debug, Default)]
pub struct JarStore {
    values: HashMap<String, String>,
}

impl JarStore {
    /// Create an empty store; one per process run
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under a header key, replacing any earlier one
    pub fn put(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    /// Look up the last value stored under a header key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing has been stored yet
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let mut store = JarStore::new();
        store.put("X-Token", "first");
        store.put("X-Token", "second");
        assert_eq!(store.get("X-Token"), Some("second"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn missing_key_is_none() {
        let store = JarStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("X-Token"), None);
    }
}
