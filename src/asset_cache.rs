//! The [AssetCache] sits between whatever wants an asset and the loader which produces it.
//!
//! Asking for a key which isn't present creates a pending slot, and everyone who asks before the loader finishes
//! shares that one load by registering a [Listener].  The loader reports back with [AssetCache::set], which runs the
//! listeners in the order they were registered.  Anyone who asks afterwards gets the payload straight away, and any
//! listener they pass runs before `get` returns.
//!
//! Nothing is evicted for being big.  Instead, the host calls [AssetCache::sweep] from its main loop, and entries
//! which have been resolved and then left alone for longer than the configured window are removed, releasing any GPU
//! textures or streaming references they hold through a [ResourceContext].  Pending entries are never swept, since
//! someone is still waiting on them.  Entries which must stay around regardless may be pinned with [AssetCache::pin],
//! at which point they may only be removed with [AssetCache::remove] or [AssetCache::clear].
use std::collections::HashSet;

use ahash::RandomState;
use regex::Regex;

use crate::*;

type EntryMap<V> = indexmap::IndexMap<String, V, RandomState>;

#[derive(Debug, Clone, derive_builder::Builder)]
pub struct AssetCacheConfig {
    /// Minimum time between two sweeps, in milliseconds.
    #[builder(default = "30_000")]
    pub sweep_interval: u64,
    /// How long a resolved entry may go untouched before a sweep evicts it, in milliseconds.
    #[builder(default = "120_000")]
    pub remember_window: u64,
    /// Which suffixes map to which kinds of asset.
    #[builder(default)]
    pub kinds: KindTable,
}

impl Default for AssetCacheConfig {
    fn default() -> Self {
        AssetCacheConfig {
            sweep_interval: 30_000,
            remember_window: 120_000,
            kinds: Default::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError<H: std::fmt::Debug> {
    /// The loader reported twice for the same key.
    ///
    /// The cache never took ownership of the second outcome, so it is handed back; release it with
    /// [Asset::release] if it holds anything.
    #[error("asset {key} was already resolved")]
    AlreadyResolved {
        key: String,
        rejected: Result<Asset<H>, LoadError>,
    },
}

/// Counters for the lifetime of a cache.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// `get` found a resolved entry.
    pub hits: u64,
    /// `get` had to create a slot.
    pub misses: u64,
    /// `get` joined a load already in flight.
    pub waits: u64,
    pub loaded: u64,
    pub failed: u64,
    pub evictions: u64,
    /// External handles and references released on eviction.
    pub handles_released: u64,
}

impl CacheStats {
    fn evicted(&mut self, released: usize) {
        self.evictions += 1;
        self.handles_released += released as u64;
    }
}

/// An asset cache over payloads whose graphics handles are of type `H`.
pub struct AssetCache<H, ClockImpl: Clock = MonotonicClock> {
    config: AssetCacheConfig,
    /// In insertion order, which is the order [AssetCache::search] reports.
    entries: EntryMap<CacheEntry<Asset<H>>>,
    access_times: AccessTimeTracker,
    sweeper: Sweeper,
    clock: ClockImpl,
    stats: CacheStats,
}

impl<H: Copy + Eq + std::fmt::Debug> AssetCache<H, MonotonicClock> {
    pub fn new(config: AssetCacheConfig) -> AssetCache<H, MonotonicClock> {
        AssetCache::with_clock(config, MonotonicClock::new())
    }
}

impl<H: Copy + Eq + std::fmt::Debug, ClockImpl: Clock> AssetCache<H, ClockImpl> {
    pub fn with_clock(config: AssetCacheConfig, clock: ClockImpl) -> AssetCache<H, ClockImpl> {
        AssetCache {
            entries: Default::default(),
            access_times: AccessTimeTracker::new(),
            sweeper: Sweeper::new(config.sweep_interval),
            clock,
            stats: Default::default(),
            config,
        }
    }

    /// Find the index of a key's slot, creating a pending one if there isn't one yet.
    fn slot_index(&mut self, key: &str) -> (usize, bool) {
        if let Some(i) = self.entries.get_index_of(key) {
            return (i, false);
        }

        let kind = self.config.kinds.kind_of(key);
        log::debug!("Creating slot for {} ({:?})", key, kind);
        let (i, _) = self
            .entries
            .insert_full(key.to_string(), CacheEntry::new(kind));
        (i, true)
    }

    fn get_inner(&mut self, key: &str, listener: Option<Listener<Asset<H>>>) -> Lookup<'_, Asset<H>> {
        self.access_times.touch(key, self.clock.now());
        let (index, created) = self.slot_index(key);
        let entry = &mut self.entries[index];

        if created {
            self.stats.misses += 1;
        } else if entry.is_resolved() {
            log::trace!("Hit for {}", key);
            self.stats.hits += 1;
        } else {
            self.stats.waits += 1;
        }

        if let Some(l) = listener {
            entry.listen(l);
        }
        entry.lookup()
    }

    /// Get an asset, creating a pending slot for it if nobody has asked before.
    ///
    /// A pending lookup means someone needs to load the asset and report back with [AssetCache::set].
    pub fn get(&mut self, key: &str) -> Lookup<'_, Asset<H>> {
        self.get_inner(key, None)
    }

    /// Like [AssetCache::get], but also register a listener.
    ///
    /// If the entry is already resolved, the listener runs before this returns.
    pub fn get_with(&mut self, key: &str, listener: Listener<Asset<H>>) -> Lookup<'_, Asset<H>> {
        self.get_inner(key, Some(listener))
    }

    /// Is there a slot for this key, in any state?
    pub fn exists(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn status(&self, key: &str) -> Option<EntryStatus> {
        self.entries.get(key).map(|e| e.status())
    }

    /// Report the outcome of loading `key`, running everything waiting on it.
    ///
    /// Creates the slot if nobody asked for it first.  A payload which is empty counts as a failure with
    /// [LoadError::Empty].  An entry may only be resolved once; reporting again fails with
    /// [CacheError::AlreadyResolved] and leaves the entry as it was.
    pub fn set(&mut self, key: &str, outcome: Result<Asset<H>, LoadError>) -> Result<(), CacheError<H>> {
        let outcome = match outcome {
            Ok(a) if a.is_empty() => Err(LoadError::Empty),
            o => o,
        };

        let (index, created) = self.slot_index(key);
        if created {
            self.access_times.touch(key, self.clock.now());
        }
        let entry = &mut self.entries[index];

        if let Ok(a) = &outcome {
            if a.kind() != entry.kind && a.kind() != AssetKind::Opaque {
                log::warn!(
                    "{} holds a {:?} payload but is a {:?} key; it will not be reclaimed",
                    key,
                    a.kind(),
                    entry.kind
                );
            }
        }

        let failed = outcome.is_err();
        let waiting = entry.waiting();
        if let Err(rejected) = entry.resolve(outcome) {
            log::warn!("Refusing to resolve {} a second time", key);
            return Err(CacheError::AlreadyResolved {
                key: key.to_string(),
                rejected,
            });
        }

        if failed {
            self.stats.failed += 1;
        } else {
            self.stats.loaded += 1;
        }
        log::debug!(
            "Resolved {} ({}), notified {} listeners",
            key,
            if failed { "failed" } else { "loaded" },
            waiting
        );
        Ok(())
    }

    /// All keys matching `pattern`, in the order they were first seen.
    pub fn search(&self, pattern: &Regex) -> Vec<String> {
        self.entries
            .keys()
            .filter(|k| pattern.is_match(k))
            .cloned()
            .collect()
    }

    /// Remove an entry, releasing whatever external resources its payload holds.
    ///
    /// Returns false, and does nothing, if the key isn't present.  Listeners still waiting on a pending entry are
    /// dropped without being called.
    pub fn remove<C: ResourceContext<Handle = H>>(&mut self, ctx: &mut C, key: &str) -> bool {
        let released = match self.entries.get(key) {
            Some(entry) => Self::reclaim_entry(ctx, key, entry),
            None => return false,
        };

        self.entries.shift_remove(key);
        self.access_times.forget(key);
        self.stats.evicted(released);
        true
    }

    fn reclaim_entry<C: ResourceContext<Handle = H>>(ctx: &mut C, key: &str, entry: &CacheEntry<Asset<H>>) -> usize {
        if entry.waiting() > 0 {
            log::warn!(
                "Evicting {} while {} listeners are still waiting on it",
                key,
                entry.waiting()
            );
        }
        let released = entry
            .asset()
            .map(|a| reclaim(ctx, entry.kind, a))
            .unwrap_or(0);
        log::debug!("Evicted {}, released {} resources", key, released);
        released
    }

    /// Evict every resolved, unpinned entry which has been idle for the remember window.
    ///
    /// Does nothing unless the sweep interval has passed since the last sweep which ran.  Returns how many entries
    /// were evicted.
    pub fn sweep<C: ResourceContext<Handle = H>>(&mut self, ctx: &mut C, now: u64) -> usize {
        if !self.sweeper.begin(now) {
            return 0;
        }

        let window = self.config.remember_window;
        let access_times = &self.access_times;
        // Decide first, then evict everything decided on in one pass over the map.
        let idle = self
            .entries
            .iter()
            .filter(|(key, entry)| {
                if !entry.is_resolved() || entry.pinned {
                    return false;
                }
                match access_times.is_idle(key, now, window) {
                    Some(idle) => idle,
                    None => {
                        log::error!("{} is cached but has no recorded access time", key);
                        false
                    }
                }
            })
            .map(|(key, _)| key.clone())
            .collect::<HashSet<String, RandomState>>();

        if idle.is_empty() {
            return 0;
        }

        let access_times = &mut self.access_times;
        let stats = &mut self.stats;
        self.entries.retain(|key, entry| {
            if !idle.contains(key) {
                return true;
            }
            let released = Self::reclaim_entry(&mut *ctx, key, entry);
            access_times.forget(key);
            stats.evicted(released);
            false
        });

        log::debug!("Sweep at {} evicted {} entries", now, idle.len());
        idle.len()
    }

    /// Sweep using the cache's own clock, which is the one entries were stamped with.
    pub fn sweep_now<C: ResourceContext<Handle = H>>(&mut self, ctx: &mut C) -> usize {
        let now = self.clock.now();
        self.sweep(ctx, now)
    }

    /// Evict everything, pinned and pending entries included.  Returns how many entries were evicted.
    pub fn clear<C: ResourceContext<Handle = H>>(&mut self, ctx: &mut C) -> usize {
        let entries = std::mem::take(&mut self.entries);
        self.access_times.clear();

        let count = entries.len();
        for (key, entry) in entries {
            let released = Self::reclaim_entry(ctx, &key, &entry);
            self.stats.evicted(released);
        }
        count
    }

    /// Exempt an entry from sweeping.  Returns false if the key isn't present.
    pub fn pin(&mut self, key: &str) -> bool {
        self.set_pinned(key, true)
    }

    pub fn unpin(&mut self, key: &str) -> bool {
        self.set_pinned(key, false)
    }

    fn set_pinned(&mut self, key: &str, pinned: bool) -> bool {
        match self.entries.get_mut(key) {
            Some(e) => {
                e.pinned = pinned;
                true
            }
            None => false,
        }
    }

    /// The current time on the clock entries are stamped with.  Pass this, or something later, to
    /// [AssetCache::sweep].
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn clock(&self) -> &ClockImpl {
        &self.clock
    }

    pub fn last_access(&self, key: &str) -> Option<u64> {
        self.access_times.last_access(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn config(&self) -> &AssetCacheConfig {
        &self.config
    }
}
