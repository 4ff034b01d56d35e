//! TV static: random colors in 2x2 blocks.

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::*;

use super::fill_frame;
use crate::assets::hash;

/// Block noise generator. Each frame draws a fresh pattern.
#[derive(Clone, Copy, Debug, Default)]
pub struct TvStatic {
    frame: u32,
}

impl TvStatic {
    pub const fn new(seed: u32) -> Self { Self { frame: seed } }

    /// Draw one frame of static at half resolution, each sample filling a 2x2 block.
    pub fn draw<D>(
        &mut self,
        target: &mut D,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        self.frame = self.frame.wrapping_add(1);
        let frame = self.frame;
        fill_frame(target, |p| {
            let block = ((p.y as u32 / 2) << 16) | (p.x as u32 / 2);
            let h = hash(frame, block);
            Rgb888::new(h as u8, (h >> 8) as u8, (h >> 16) as u8)
        })
    }
}
