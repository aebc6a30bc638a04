//! Per-trial invocation counting.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Cloneable handle onto shared per-tool invocation counts.
///
/// Trials run strictly one at a time; `reset()` before each trial is what
/// scopes the counts to a single trial. The mutex only makes the handle safe
/// to clone into the tool context across the async boundary, it is not a
/// license to run trials concurrently.
#[derive(Debug, Clone, Default)]
pub struct CallTracker {
    counts: Arc<Mutex<HashMap<String, u64>>>,
}

impl CallTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all counts unconditionally.
    pub fn reset(&self) {
        self.counts.lock().unwrap().clear();
    }

    /// Record one invocation of `name`, creating the entry at 1 if absent.
    pub fn record(&self, name: &str) {
        let mut counts = self.counts.lock().unwrap();
        *counts.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Invocations of `name` since the last reset, 0 if never recorded.
    pub fn count(&self, name: &str) -> u64 {
        self.counts.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    /// Snapshot of all recorded counts. Later mutation of the tracker does
    /// not affect the returned map.
    pub fn summary(&self) -> HashMap<String, u64> {
        self.counts.lock().unwrap().clone()
    }
}
