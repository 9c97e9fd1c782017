//! Decoded payloads, and the mapping from a key's suffix to the kind of payload it should hold.
//!
//! Keys are filenames.  The part after the last `.`, lower-cased, is the key's discriminator; a [KindTable] turns that
//! into an [AssetKind] once, when the cache first sees the key.  The kind decides which reclamation routine runs when
//! the entry is evicted.
use std::collections::HashMap;

use ahash::RandomState;

/// One frame of a sprite sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteFrame<H> {
    pub width: u32,
    pub height: u32,
    /// Indexed pixels, one byte per pixel.
    pub pixels: Vec<u8>,
    /// The uploaded texture, if the renderer has uploaded this frame yet.
    pub texture: Option<H>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteAsset<H> {
    pub frames: Vec<SpriteFrame<H>>,
    /// An atlas texture covering the whole sheet.
    pub texture: Option<H>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteAsset<H> {
    pub colors: Vec<[u8; 3]>,
    pub texture: Option<H>,
}

/// A payload which lives outside the process's heap, reachable through a revocable reference such as a streaming
/// media URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientBlob {
    pub reference: String,
    pub mime_type: Option<String>,
}

/// A decoded payload, generic over the graphics handle type `H`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset<H> {
    Sprite(SpriteAsset<H>),
    Palette(PaletteAsset<H>),
    TransientBlob(TransientBlob),
    /// Raw bytes or text, which hold no external resources.
    Opaque(Vec<u8>),
}

impl<H> Asset<H> {
    /// The kind this payload's variant corresponds to.
    pub fn kind(&self) -> AssetKind {
        match self {
            Asset::Sprite(_) => AssetKind::Sprite,
            Asset::Palette(_) => AssetKind::Palette,
            Asset::TransientBlob(_) => AssetKind::TransientBlob,
            Asset::Opaque(_) => AssetKind::Opaque,
        }
    }

    /// Does this payload hold nothing at all?  The cache treats an empty payload as a failed load.
    pub fn is_empty(&self) -> bool {
        match self {
            Asset::Sprite(s) => s.frames.is_empty() && s.texture.is_none(),
            Asset::Palette(p) => p.colors.is_empty() && p.texture.is_none(),
            Asset::TransientBlob(b) => b.reference.is_empty(),
            Asset::Opaque(bytes) => bytes.is_empty(),
        }
    }
}

/// Which reclamation routine a key's entry gets on eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Sprite,
    Palette,
    TransientBlob,
    /// Anything unrecognized.  Reclaiming these does nothing.
    Opaque,
}

/// Get the discriminator of a key: everything after the last `.`, lower-cased.
///
/// Keys without a `.` have the empty discriminator.
pub fn discriminator(key: &str) -> String {
    match key.rfind('.') {
        Some(i) => key[i + 1..].to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Maps discriminators to [AssetKind]s.
///
/// Built once at startup as part of [AssetCacheConfig](crate::AssetCacheConfig).
#[derive(Debug, Clone)]
pub struct KindTable {
    kinds: HashMap<String, AssetKind, RandomState>,
}

impl KindTable {
    /// A table which knows no suffixes, so every key is [AssetKind::Opaque].
    pub fn empty() -> KindTable {
        KindTable {
            kinds: Default::default(),
        }
    }

    /// Register a suffix.  Leading dots are ignored and matching is case-insensitive.
    pub fn with(mut self, suffix: &str, kind: AssetKind) -> KindTable {
        let suffix = suffix.trim_start_matches('.').to_ascii_lowercase();
        self.kinds.insert(suffix, kind);
        self
    }

    pub fn kind_of(&self, key: &str) -> AssetKind {
        self.kinds
            .get(&discriminator(key))
            .copied()
            .unwrap_or(AssetKind::Opaque)
    }
}

impl Default for KindTable {
    fn default() -> Self {
        KindTable::empty()
            .with("spr", AssetKind::Sprite)
            .with("pal", AssetKind::Palette)
            .with("mp3", AssetKind::TransientBlob)
            .with("ogg", AssetKind::TransientBlob)
            .with("wav", AssetKind::TransientBlob)
            .with("webm", AssetKind::TransientBlob)
    }
}
