//! Color constants, parsing and the two color operations the skins rely on.
//!
//! Settings store colors as text (`#rrggbb`, `#rgb` or a name). Skins parse
//! them into [`Rgb888`] so blending and hue rotation run at full 8-bit
//! precision, and convert to [`Rgb565`] only when writing to the framebuffer.

use embedded_graphics::pixelcolor::{Rgb565, Rgb888, RgbColor};
use palette::{FromColor, Hsv, Srgb};

// =============================================================================
// Standard Colors (from RgbColor trait)
// =============================================================================

/// Pure black. Fallback for unparseable colors.
pub const BLACK: Rgb888 = Rgb888::BLACK;

/// Pure white.
pub const WHITE: Rgb888 = Rgb888::WHITE;

/// Pure red.
pub const RED: Rgb888 = Rgb888::RED;

/// Pure green.
pub const GREEN: Rgb888 = Rgb888::GREEN;

/// Pure blue.
pub const BLUE: Rgb888 = Rgb888::BLUE;

/// Pure yellow.
pub const YELLOW: Rgb888 = Rgb888::YELLOW;

/// Pure cyan.
pub const CYAN: Rgb888 = Rgb888::CYAN;

/// Pure magenta.
pub const MAGENTA: Rgb888 = Rgb888::MAGENTA;

// =============================================================================
// Custom Colors
// =============================================================================

/// Mid gray.
pub const GRAY: Rgb888 = Rgb888::new(128, 128, 128);

/// Orange.
pub const ORANGE: Rgb888 = Rgb888::new(255, 165, 0);

/// Named colors accepted in settings, matched case-insensitively.
const NAMED: [(&str, Rgb888); 10] = [
    ("black", BLACK),
    ("white", WHITE),
    ("red", RED),
    ("green", GREEN),
    ("blue", BLUE),
    ("yellow", YELLOW),
    ("cyan", CYAN),
    ("magenta", MAGENTA),
    ("gray", GRAY),
    ("orange", ORANGE),
];

// =============================================================================
// Parsing
// =============================================================================

/// Parse `#rrggbb`, `#rgb` or a color name.
pub fn parse_color(text: &str) -> Option<Rgb888> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex(hex);
    }

    NAMED
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(text))
        .map(|(_, color)| *color)
}

/// Parse a color, falling back to black.
#[inline]
pub fn color_or_black(text: &str) -> Rgb888 { parse_color(text).unwrap_or(BLACK) }

fn parse_hex(hex: &str) -> Option<Rgb888> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    match hex.len() {
        6 => {
            let value = u32::from_str_radix(hex, 16).ok()?;
            Some(Rgb888::new((value >> 16) as u8, (value >> 8) as u8, value as u8))
        }
        3 => {
            let value = u16::from_str_radix(hex, 16).ok()?;
            // Each nibble is doubled: #abc -> #aabbcc
            let expand = |n: u16| ((n & 0xF) * 0x11) as u8;
            Some(Rgb888::new(expand(value >> 8), expand(value >> 4), expand(value)))
        }
        _ => None,
    }
}

/// Convert to the framebuffer format.
#[inline]
pub fn to_rgb565(color: Rgb888) -> Rgb565 { Rgb565::from(color) }

// =============================================================================
// Blending
// =============================================================================

/// Linear per-channel interpolation between two colors.
///
/// `t` is clamped to `[0, 1]`; each channel is rounded to the nearest integer,
/// so `blend(a, b, 0.0) == a` and `blend(a, b, 1.0) == b` exactly.
pub fn blend(
    from: Rgb888,
    to: Rgb888,
    t: f32,
) -> Rgb888 {
    let t = t.clamp(0.0, 1.0);
    let channel = |a: u8, b: u8| {
        let value = f32::from(a) + (f32::from(b) - f32::from(a)) * t;
        micromath::F32(value).round().0.clamp(0.0, 255.0) as u8
    };

    Rgb888::new(channel(from.r(), to.r()), channel(from.g(), to.g()), channel(from.b(), to.b()))
}

/// Alpha-composite `fg` over `bg` with an 8-bit coverage.
///
/// Integer version of [`blend`] used per pixel when pasting sprites.
#[inline]
pub fn composite(
    bg: Rgb888,
    fg: Rgb888,
    alpha: u8,
) -> Rgb888 {
    match alpha {
        0 => bg,
        255 => fg,
        a => {
            let a = u16::from(a);
            let channel = |b: u8, f: u8| ((u16::from(b) * (255 - a) + u16::from(f) * a + 127) / 255) as u8;
            Rgb888::new(channel(bg.r(), fg.r()), channel(bg.g(), fg.g()), channel(bg.b(), fg.b()))
        }
    }
}

// =============================================================================
// Hue Rotation
// =============================================================================

/// Number of steps in the hue ring used by `tint`.
pub const HUE_STEPS: i32 = 256;

/// Rotate the hue of a color by `tint` steps of a 256-step ring.
///
/// Saturation and value are kept; gray pixels are unchanged.
pub fn shift_hue(
    color: Rgb888,
    tint: i32,
) -> Rgb888 {
    let steps = tint.rem_euclid(HUE_STEPS);
    if steps == 0 {
        return color;
    }

    let rgb = Srgb::new(color.r(), color.g(), color.b()).into_format::<f32>();
    let hsv: Hsv = Hsv::from_color(rgb);
    let degrees = (hsv.hue.into_positive_degrees() + steps as f32 * 360.0 / HUE_STEPS as f32) % 360.0;
    let rotated: Hsv = Hsv::new(degrees, hsv.saturation, hsv.value);
    let shifted: Srgb = Srgb::from_color(rotated);
    let shifted = shifted.into_format::<u8>();

    Rgb888::new(shifted.red, shifted.green, shifted.blue)
}
