//! The traits through which the cache talks to the rest of the client.
//!
//! The cache never owns a GPU or a media player.  Whoever does hands a [ResourceContext] to
//! [AssetCache::remove](crate::AssetCache::remove) and [AssetCache::sweep](crate::AssetCache::sweep), and the
//! reclamation routines use it to let go of anything a payload still points at.

/// Something which owns external resources referenced by cached payloads, usually a graphics context.
pub trait ResourceContext {
    /// A handle to a resource owned by this context, for example a texture name.
    type Handle: Copy + Eq + std::fmt::Debug;

    /// Is this a live handle which belongs to this context?
    ///
    /// Reclamation never releases a handle for which this returns false.
    fn is_live(&self, handle: Self::Handle) -> bool;

    /// Release a live handle.
    fn release(&mut self, handle: Self::Handle);

    /// Does this context still hold the transient reference (for example a streaming media URL)?
    fn holds_reference(&self, _reference: &str) -> bool {
        true
    }

    /// Revoke a transient reference previously handed out by this context.
    fn revoke_reference(&mut self, reference: &str);
}

/// A monotonic clock, in milliseconds.
///
/// Timestamps only have to be comparable with each other and with the `now` handed to
/// [AssetCache::sweep](crate::AssetCache::sweep).
pub trait Clock {
    fn now(&self) -> u64;
}
