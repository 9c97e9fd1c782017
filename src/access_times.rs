//! Records when each key was last touched, which is all eviction looks at.
use std::collections::HashMap;

use ahash::RandomState;

#[derive(Debug, Default)]
pub struct AccessTimeTracker {
    times: HashMap<String, u64, RandomState>,
}

impl AccessTimeTracker {
    pub fn new() -> AccessTimeTracker {
        Default::default()
    }

    /// Record an access, overwriting whatever was there.
    pub fn touch(&mut self, key: &str, time: u64) {
        match self.times.get_mut(key) {
            Some(t) => *t = time,
            None => {
                self.times.insert(key.to_string(), time);
            }
        }
    }

    pub fn last_access(&self, key: &str) -> Option<u64> {
        self.times.get(key).copied()
    }

    pub fn forget(&mut self, key: &str) -> Option<u64> {
        self.times.remove(key)
    }

    /// Has `key` gone untouched for at least `window` as of `now`?
    ///
    /// `None` if the key was never touched.
    pub fn is_idle(&self, key: &str, now: u64, window: u64) -> Option<bool> {
        let last = self.last_access(key)?;
        Some(last.saturating_add(window) <= now)
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn clear(&mut self) {
        self.times.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_overwrites() {
        let mut tracker = AccessTimeTracker::new();
        tracker.touch("a", 10);
        tracker.touch("a", 5);
        assert_eq!(tracker.last_access("a"), Some(5));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_forget() {
        let mut tracker = AccessTimeTracker::new();
        tracker.touch("a", 1);
        assert_eq!(tracker.forget("a"), Some(1));
        assert_eq!(tracker.last_access("a"), None);
        assert_eq!(tracker.forget("a"), None);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_idle_boundaries() {
        let mut tracker = AccessTimeTracker::new();
        tracker.touch("a", 1000);
        assert_eq!(tracker.is_idle("a", 1099, 100), Some(false));
        assert_eq!(tracker.is_idle("a", 1100, 100), Some(true));
        assert_eq!(tracker.is_idle("missing", 1100, 100), None);

        // Early in the session `now - window` would underflow; that must not make anything idle.
        tracker.touch("b", 0);
        assert_eq!(tracker.is_idle("b", 30_000, 120_000), Some(false));
        assert_eq!(tracker.is_idle("b", u64::MAX, u64::MAX), Some(false));
    }
}
