//! Releasing the external resources a payload holds when its entry is evicted.
//!
//! Which routine runs is decided by the [AssetKind] the entry got from its key, not by what the loader happened to
//! hand back: a payload whose variant doesn't match its key's kind is left alone, as is anything of kind
//! [AssetKind::Opaque].  Every routine checks [ResourceContext::is_live] before releasing, so handles which were
//! already released or which belong to some other context are never touched.
use crate::*;

fn release_if_live<C: ResourceContext>(ctx: &mut C, handle: Option<C::Handle>) -> usize {
    match handle {
        Some(h) if ctx.is_live(h) => {
            ctx.release(h);
            1
        }
        _ => 0,
    }
}

impl<H: Copy + Eq + std::fmt::Debug> SpriteAsset<H> {
    /// Release every frame's texture, then the sheet's own.  Returns how many handles were released.
    pub fn release<C: ResourceContext<Handle = H>>(&self, ctx: &mut C) -> usize {
        let frames: usize = self
            .frames
            .iter()
            .map(|f| release_if_live(ctx, f.texture))
            .sum();
        frames + release_if_live(ctx, self.texture)
    }
}

impl<H: Copy + Eq + std::fmt::Debug> PaletteAsset<H> {
    pub fn release<C: ResourceContext<Handle = H>>(&self, ctx: &mut C) -> usize {
        release_if_live(ctx, self.texture)
    }
}

impl TransientBlob {
    pub fn release<C: ResourceContext>(&self, ctx: &mut C) -> usize {
        if !ctx.holds_reference(&self.reference) {
            return 0;
        }
        ctx.revoke_reference(&self.reference);
        1
    }
}

impl<H: Copy + Eq + std::fmt::Debug> Asset<H> {
    /// Release whatever this payload holds, according to its own variant.
    pub fn release<C: ResourceContext<Handle = H>>(&self, ctx: &mut C) -> usize {
        match self {
            Asset::Sprite(s) => s.release(ctx),
            Asset::Palette(p) => p.release(ctx),
            Asset::TransientBlob(b) => b.release(ctx),
            Asset::Opaque(_) => 0,
        }
    }
}

/// Run the reclamation routine for `kind` over `asset`, returning the number of resources released.
pub fn reclaim<C: ResourceContext>(ctx: &mut C, kind: AssetKind, asset: &Asset<C::Handle>) -> usize {
    if kind == AssetKind::Opaque || asset.kind() != kind {
        return 0;
    }
    asset.release(ctx)
}
