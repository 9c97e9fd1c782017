//! Rate limiting for [AssetCache::sweep](crate::AssetCache::sweep).
#[derive(Debug, Clone)]
pub struct Sweeper {
    interval: u64,
    last_sweep: u64,
}

impl Sweeper {
    pub fn new(interval: u64) -> Sweeper {
        Sweeper {
            interval,
            last_sweep: 0,
        }
    }

    /// Decide whether a sweep may run at `now`.  If it may, `now` becomes the last sweep time whether or not anything
    /// ends up being evicted.
    pub fn begin(&mut self, now: u64) -> bool {
        if now < self.last_sweep.saturating_add(self.interval) {
            return false;
        }
        self.last_sweep = now;
        true
    }

    pub fn last_sweep(&self) -> u64 {
        self.last_sweep
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit() {
        let mut sweeper = Sweeper::new(30);
        assert!(!sweeper.begin(29));
        assert_eq!(sweeper.last_sweep(), 0);
        assert!(sweeper.begin(30));
        assert_eq!(sweeper.last_sweep(), 30);
        assert!(!sweeper.begin(30));
        assert!(!sweeper.begin(59));
        assert!(sweeper.begin(75));
        assert_eq!(sweeper.last_sweep(), 75);
    }

    #[test]
    fn test_zero_interval_always_runs() {
        let mut sweeper = Sweeper::new(0);
        assert!(sweeper.begin(0));
        assert!(sweeper.begin(0));
    }
}
