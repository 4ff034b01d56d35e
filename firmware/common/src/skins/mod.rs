//! Frame renderers for every visual mode.
//!
//! Each renderer composes one full frame into any `DrawTarget<Color = Rgb565>`.
//! Renderers do not rate-limit themselves; the [`crate::scheduler`] owns the
//! redraw gates and only calls a renderer when its gate opens.
//!
//! | Mode | Renderer |
//! |------|----------|
//! | Logo | [`draw_logo`] |
//! | WaitHandshake | [`draw_loading`] |
//! | Error | [`ErrorBanner::draw`] |
//! | TV static | [`TvStatic::draw`] |
//! | Simple eye | [`draw_simple`] |
//! | Metallic eye | [`draw_metal`] |
//! | Neon eye | [`draw_neon`] |

mod banner;
mod logo;
mod metal;
mod neon;
mod simple;
mod tv_static;

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::*;

pub use self::banner::{ErrorBanner, draw_loading, format_error_text};
pub use self::logo::draw_logo;
pub use self::metal::draw_metal;
pub use self::neon::{draw_neon, neon_progress};
pub use self::simple::draw_simple;
pub use self::tv_static::TvStatic;
use crate::assets::{Rgba, Sprite};
use crate::colors::to_rgb565;

/// Compose a whole frame, computing each pixel with `shade`.
///
/// Pixels are produced in row-major order and written with one
/// `fill_contiguous` call.
pub fn fill_frame<D, F>(
    target: &mut D,
    mut shade: F,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
    F: FnMut(Point) -> Rgb888,
{
    let area = target.bounding_box();
    target.fill_contiguous(&area, area.points().map(|p| to_rgb565(shade(p))))
}

/// A sprite placed with its center on a point.
pub struct Placed<S> {
    sprite: S,
    top_left: Point,
    size: Size,
}

impl<S: Sprite> Placed<S> {
    pub fn centered(
        sprite: S,
        center: Point,
    ) -> Self {
        let size = sprite.size();
        let top_left = center - Point::new(size.width as i32 / 2, size.height as i32 / 2);
        Self { sprite, top_left, size }
    }

    /// Sprite pixel covering `p`, if any.
    #[inline]
    pub fn sample(
        &self,
        p: Point,
    ) -> Option<Rgba> {
        let local = p - self.top_left;
        if local.x < 0 || local.y < 0 {
            return None;
        }
        let (x, y) = (local.x as u32, local.y as u32);
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let px = self.sprite.pixel(x, y);
        (px.alpha > 0).then_some(px)
    }
}

/// Non-negative size option as a pixel length.
#[inline]
pub(crate) fn size_option(value: i32) -> u32 { value.max(0) as u32 }

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers shared by the renderer tests.

    use embedded_graphics::pixelcolor::Rgb565;

    use crate::config::FRAME_BYTES;
    use crate::framebuffer::Framebuffer;

    /// 240x240 frame buffer.
    pub fn frame() -> Vec<u8> { vec![0u8; FRAME_BYTES] }

    pub fn target(buf: &mut [u8]) -> Framebuffer<'_> { Framebuffer::new(buf, 240, 240).unwrap() }

    pub fn at(
        fb: &Framebuffer<'_>,
        x: u32,
        y: u32,
    ) -> Rgb565 {
        fb.pixel(x, y).unwrap()
    }
}
