//! An in-process cache for assets which a client streams in on demand: sprite sheets, palettes, audio and text.
//!
//! Decoding the same sprite sheet twice is wasteful, but so is keeping every sheet the player has ever walked past
//! resident forever, especially when each one also pins GPU textures.  This crate provides [AssetCache], which:
//!
//! - Gives every key (a filename) one slot.  The first request for a key creates it as pending, and everyone asking
//!   while the load is in flight registers a [Listener] instead of starting another load.
//! - Runs those listeners, in order, when the loader reports back with [AssetCache::set].  Listeners registered after
//!   that run immediately.
//! - Evicts entries which have been resolved and then left untouched for a while, when the host calls
//!   [AssetCache::sweep].  Sweeps are rate limited, so it's fine to call this every frame.
//! - Releases the external resources held by an evicted payload exactly once, through a [ResourceContext].  Which
//!   routine runs is decided by the key's suffix: `.spr` releases per-frame and sheet textures, `.pal` its texture,
//!   audio suffixes revoke their streaming reference, and everything else holds nothing.
//!
//! The cache is a plain value with `&mut self` methods.  Keep one per client session, and put it behind a single
//! `Mutex` if more than one thread needs it.
//!
//! To use this crate, implement [ResourceContext] over your renderer, construct an [AssetCache] with your chosen
//! [AssetCacheConfig], and call [AssetCache::sweep] from the main loop.
mod access_times;
mod asset;
mod asset_cache;
mod clock;
mod entry;
mod reclaim;
mod sweeper;
mod traits;

#[cfg(test)]
mod test_support;

pub use access_times::*;
pub use asset::*;
pub use asset_cache::*;
pub use clock::*;
pub use entry::*;
pub use reclaim::*;
pub use sweeper::*;
pub use traits::*;
