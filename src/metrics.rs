//! Extraction counters.
//!
//! The registry is owned by the process entry point and injected into the
//! processor; the library never holds global mutable state. A single lock
//! guards registration and recording.

use std::collections::HashMap;
use std::sync::Mutex;

/// Mutex-guarded counter registry.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    counters: Mutex<HashMap<String, u64>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments a counter, registering it on first use.
    pub fn incr(&self, name: &str) {
        self.incr_by(name, 1);
    }

    /// Adds `delta` to a counter, registering it on first use.
    pub fn incr_by(&self, name: &str, delta: u64) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        *counters.entry(name.to_string()).or_insert(0) += delta;
    }

    /// Current value of a counter; unregistered counters read as 0.
    pub fn get(&self, name: &str) -> u64 {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters.get(name).copied().unwrap_or(0)
    }

    /// Snapshot of all counters, sorted by name.
    pub fn snapshot(&self) -> Vec<(String, u64)> {
        let counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries: Vec<_> = counters
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect();
        entries.sort();
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incr_and_get() {
        let metrics = MetricsRegistry::new();
        metrics.incr("files.processed");
        metrics.incr("files.processed");
        assert_eq!(metrics.get("files.processed"), 2);
        assert_eq!(metrics.get("files.failed"), 0);
    }

    #[test]
    fn test_snapshot_sorted() {
        let metrics = MetricsRegistry::new();
        metrics.incr("b");
        metrics.incr("a");
        let names: Vec<_> = metrics.snapshot().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
