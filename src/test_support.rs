//! A fake graphics context shared by the tests.
use std::collections::HashSet;

use crate::*;

#[derive(Debug, Default)]
pub(crate) struct FakeGpu {
    next: u32,
    pub(crate) live: HashSet<u32>,
    /// Every release, in order.
    pub(crate) released: Vec<u32>,
    pub(crate) revoked: Vec<String>,
    pub(crate) references: HashSet<String>,
}

impl FakeGpu {
    pub(crate) fn new() -> FakeGpu {
        Default::default()
    }

    pub(crate) fn upload(&mut self) -> u32 {
        self.next += 1;
        self.live.insert(self.next);
        self.next
    }

    pub(crate) fn stream(&mut self, reference: &str) -> String {
        self.references.insert(reference.to_string());
        reference.to_string()
    }

    pub(crate) fn sprite(&mut self, frames: usize) -> Asset<u32> {
        let frames = (0..frames)
            .map(|_| SpriteFrame {
                width: 2,
                height: 2,
                pixels: vec![0; 4],
                texture: Some(self.upload()),
            })
            .collect();
        Asset::Sprite(SpriteAsset {
            frames,
            texture: Some(self.upload()),
        })
    }

    pub(crate) fn palette(&mut self) -> Asset<u32> {
        Asset::Palette(PaletteAsset {
            colors: vec![[0, 0, 0], [255, 255, 255]],
            texture: Some(self.upload()),
        })
    }
}

impl ResourceContext for FakeGpu {
    type Handle = u32;

    fn is_live(&self, handle: u32) -> bool {
        self.live.contains(&handle)
    }

    fn release(&mut self, handle: u32) {
        assert!(self.live.remove(&handle), "released a dead handle {}", handle);
        self.released.push(handle);
    }

    fn holds_reference(&self, reference: &str) -> bool {
        self.references.contains(reference)
    }

    fn revoke_reference(&mut self, reference: &str) {
        assert!(self.references.remove(reference));
        self.revoked.push(reference.to_string());
    }
}
