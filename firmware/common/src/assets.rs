//! Sprites used by the skins.
//!
//! Skins never own pixel data. They ask an [`ImageProvider`] for named
//! [`Sprite`]s and sample them per pixel, which lets the firmware run without
//! image files or an allocator. [`ProceduralAssets`] computes every sprite
//! from a formula; a provider backed by decoded images can be swapped in
//! without touching the renderers.

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::Size;

/// Color plus 8-bit coverage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub color: Rgb888,
    pub alpha: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(Rgb888::BLACK, 0);

    pub const fn new(
        color: Rgb888,
        alpha: u8,
    ) -> Self {
        Self { color, alpha }
    }

    pub const fn opaque(color: Rgb888) -> Self { Self::new(color, 255) }
}

/// A bitmap sampled by coordinate.
pub trait Sprite {
    fn size(&self) -> Size;

    /// Pixel at `(x, y)`; callers stay within [`Sprite::size`].
    fn pixel(
        &self,
        x: u32,
        y: u32,
    ) -> Rgba;
}

impl<S: Sprite + ?Sized> Sprite for &S {
    fn size(&self) -> Size { (**self).size() }

    fn pixel(
        &self,
        x: u32,
        y: u32,
    ) -> Rgba {
        (**self).pixel(x, y)
    }
}

/// Nearest-neighbour resize of another sprite.
#[derive(Clone, Copy, Debug)]
pub struct Scaled<S> {
    inner: S,
    size: Size,
}

impl<S: Sprite> Scaled<S> {
    pub fn new(
        inner: S,
        size: Size,
    ) -> Self {
        Self { inner, size }
    }
}

impl<S: Sprite> Sprite for Scaled<S> {
    fn size(&self) -> Size { self.size }

    fn pixel(
        &self,
        x: u32,
        y: u32,
    ) -> Rgba {
        let source = self.inner.size();
        if self.size.width == 0 || self.size.height == 0 || source.width == 0 || source.height == 0 {
            return Rgba::TRANSPARENT;
        }
        let sx = (u64::from(x) * u64::from(source.width) / u64::from(self.size.width)) as u32;
        let sy = (u64::from(y) * u64::from(source.height) / u64::from(self.size.height)) as u32;
        self.inner.pixel(sx.min(source.width - 1), sy.min(source.height - 1))
    }
}

/// Named sprites the skins draw.
pub trait ImageProvider {
    /// Startup logo.
    fn logo(&self) -> &dyn Sprite;

    /// Metallic skin background.
    fn aluminum(&self) -> &dyn Sprite;

    /// Metallic skin iris, with alpha.
    fn metal_iris(&self) -> &dyn Sprite;

    /// Neon skin sprite for a `style` key, `None` if unknown.
    fn neon(
        &self,
        style: &str,
    ) -> Option<&dyn Sprite>;
}

// =============================================================================
// Procedural sprites
// =============================================================================

/// Integer hash used for texture noise.
#[inline]
pub fn hash(
    a: u32,
    b: u32,
) -> u32 {
    let mut h = a.wrapping_mul(2_654_435_761) ^ b.wrapping_mul(2_246_822_519);
    h ^= h >> 15;
    h = h.wrapping_mul(3_266_489_917);
    h ^ (h >> 13)
}

/// Signed offset in `-amplitude..=amplitude` derived from a hash.
#[inline]
fn jitter(
    h: u32,
    amplitude: i32,
) -> i32 {
    (h % (2 * amplitude as u32 + 1)) as i32 - amplitude
}

#[inline]
fn gray(level: i32) -> Rgb888 {
    let v = level.clamp(0, 255) as u8;
    Rgb888::new(v, v, v)
}

/// Coverage of a soft-edged disc; `r` is the normalized radius of the pixel.
#[inline]
fn disc_alpha(
    r: f32,
    edge: f32,
) -> u8 {
    unit_to_byte((1.0 - r) / edge)
}

/// Map `[0, 1]` to `0..=255`, rounding.
#[inline]
fn unit_to_byte(v: f32) -> u8 { (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8 }

/// Polar coordinates of a pixel relative to a sprite center, radius normalized to 1.
#[inline]
fn polar(
    x: u32,
    y: u32,
    size: u32,
) -> (f32, f32, f32) {
    let half = size as f32 / 2.0;
    let dx = (x as f32 + 0.5 - half) / half;
    let dy = (y as f32 + 0.5 - half) / half;
    let r = micromath::F32(dx * dx + dy * dy).sqrt().0;
    (dx, dy, r)
}

/// Brushed aluminum: horizontal streaks with fine grain.
#[derive(Clone, Copy, Debug)]
pub struct BrushedAluminum {
    size: Size,
}

impl Sprite for BrushedAluminum {
    fn size(&self) -> Size { self.size }

    fn pixel(
        &self,
        x: u32,
        y: u32,
    ) -> Rgba {
        // Streaks run along rows and drift slowly across the width
        let streak = jitter(hash(y, x / 48), 14);
        let grain = jitter(hash(x, y), 6);
        let sheen = 24 - (y as i32 * 48 / self.size.height.max(1) as i32);
        Rgba::opaque(gray(176 + streak + grain + sheen))
    }
}

/// Realistic iris: dark pupil, radial fibres, limbal ring and a highlight.
#[derive(Clone, Copy, Debug)]
pub struct MetalIris {
    size: u32,
}

impl Sprite for MetalIris {
    fn size(&self) -> Size { Size::new(self.size, self.size) }

    fn pixel(
        &self,
        x: u32,
        y: u32,
    ) -> Rgba {
        let (dx, dy, r) = polar(x, y, self.size);
        if r >= 1.0 {
            return Rgba::TRANSPARENT;
        }
        let alpha = disc_alpha(r, 0.04);

        // Specular highlight, upper left
        let hx = dx + 0.35;
        let hy = dy + 0.35;
        if hx * hx + hy * hy < 0.012 {
            return Rgba::new(Rgb888::new(245, 245, 250), alpha);
        }

        if r < 0.32 {
            return Rgba::new(Rgb888::new(12, 12, 16), alpha);
        }

        // Fibres: brightness varies by angle bucket
        let angle = micromath::F32(dy).atan2(micromath::F32(dx)).0;
        let bucket = ((angle + core::f32::consts::PI) * 40.0) as u32;
        let fibre = jitter(hash(bucket, 7), 28);
        let limbal = if r > 0.88 { -70 } else { 0 };
        let shade = fibre + limbal - ((r - 0.32) * 40.0) as i32;

        let channel = |base: i32| (base + shade).clamp(0, 255) as u8;
        Rgba::new(Rgb888::new(channel(40), channel(110), channel(210)), alpha)
    }
}

/// Neon sprite outlines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NeonShape {
    /// Single glowing ring.
    Ring,
    /// Two rings and a center dot.
    Target,
    /// Ring around a vertical slit pupil.
    Slit,
}

impl NeonShape {
    pub const ALL: [(&'static str, Self); 3] = [("ring", Self::Ring), ("target", Self::Target), ("slit", Self::Slit)];

    /// Shape for a style key.
    pub fn from_style(style: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(style))
            .map(|(_, shape)| *shape)
    }
}

/// White glow in the shape of a [`NeonShape`]; the neon skin recolors it.
#[derive(Clone, Copy, Debug)]
pub struct NeonSprite {
    shape: NeonShape,
    size: u32,
}

/// Coverage of a glowing stroke at `distance` from its center line.
#[inline]
fn glow(distance: f32) -> f32 {
    const CORE: f32 = 0.045;
    const HALO: f32 = 0.14;
    let d = distance.abs();
    if d <= CORE { 1.0 } else { (1.0 - (d - CORE) / HALO).clamp(0.0, 1.0) * 0.6 }
}

impl Sprite for NeonSprite {
    fn size(&self) -> Size { Size::new(self.size, self.size) }

    fn pixel(
        &self,
        x: u32,
        y: u32,
    ) -> Rgba {
        let (dx, dy, r) = polar(x, y, self.size);
        let coverage = match self.shape {
            NeonShape::Ring => glow(r - 0.78),
            NeonShape::Target => glow(r - 0.82).max(glow(r - 0.48)).max(if r < 0.14 { 1.0 } else { glow(r - 0.14) }),
            NeonShape::Slit => {
                // Distance to an ellipse with semi-axes 0.2 x 0.7, approximated
                let e = micromath::F32((dx / 0.2) * (dx / 0.2) + (dy / 0.7) * (dy / 0.7)).sqrt().0;
                let slit = if e <= 1.0 { 1.0 } else { glow((e - 1.0) * 0.2) };
                glow(r - 0.85).max(slit)
            }
        };
        Rgba::new(Rgb888::WHITE, unit_to_byte(coverage))
    }
}

/// Startup emblem: a ring with two eyes.
#[derive(Clone, Copy, Debug)]
pub struct Emblem {
    size: u32,
}

impl Sprite for Emblem {
    fn size(&self) -> Size { Size::new(self.size, self.size) }

    fn pixel(
        &self,
        x: u32,
        y: u32,
    ) -> Rgba {
        let (dx, dy, r) = polar(x, y, self.size);
        let ring = (r - 0.85).abs() < 0.08;
        let eye = |cx: f32| {
            let ex = dx - cx;
            let ey = dy + 0.1;
            ex * ex + ey * ey < 0.05
        };
        let mouth = dy > 0.35 && dy < 0.45 && dx.abs() < 0.4;
        if ring || eye(-0.32) || eye(0.32) || mouth {
            Rgba::opaque(Rgb888::WHITE)
        } else {
            Rgba::TRANSPARENT
        }
    }
}

/// Formula-based provider with every sprite the skins need.
#[derive(Clone, Copy, Debug)]
pub struct ProceduralAssets {
    logo: Emblem,
    aluminum: BrushedAluminum,
    iris: MetalIris,
    neon: [NeonSprite; 3],
}

impl ProceduralAssets {
    /// Native sprite edge length; skins scale from here.
    pub const SPRITE_SIZE: u32 = 128;

    /// Assets for a panel of the given size.
    pub const fn new(panel: Size) -> Self {
        Self {
            logo: Emblem { size: 96 },
            aluminum: BrushedAluminum { size: panel },
            iris: MetalIris { size: Self::SPRITE_SIZE },
            neon: [
                NeonSprite {
                    shape: NeonShape::Ring,
                    size: Self::SPRITE_SIZE,
                },
                NeonSprite {
                    shape: NeonShape::Target,
                    size: Self::SPRITE_SIZE,
                },
                NeonSprite {
                    shape: NeonShape::Slit,
                    size: Self::SPRITE_SIZE,
                },
            ],
        }
    }
}

impl ImageProvider for ProceduralAssets {
    fn logo(&self) -> &dyn Sprite { &self.logo }

    fn aluminum(&self) -> &dyn Sprite { &self.aluminum }

    fn metal_iris(&self) -> &dyn Sprite { &self.iris }

    fn neon(
        &self,
        style: &str,
    ) -> Option<&dyn Sprite> {
        let shape = NeonShape::from_style(style)?;
        self.neon
            .iter()
            .find(|sprite| sprite.shape == shape)
            .map(|sprite| sprite as &dyn Sprite)
    }
}
