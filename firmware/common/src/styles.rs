//! Text styles for the banners.
//!
//! Banner settings name a font family (`profont` or `mono`) and a pixel size;
//! [`banner_font`] maps that pair onto the nearest compiled-in font so the
//! renderers only ever see `&'static MonoFont`.

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::mono_font::ascii::{
    FONT_4X6,
    FONT_5X8,
    FONT_6X10,
    FONT_6X13,
    FONT_7X14,
    FONT_8X13,
    FONT_9X15,
    FONT_9X18,
    FONT_10X20,
};
use embedded_graphics::text::{Alignment, Baseline, TextStyle, TextStyleBuilder};
use profont::{
    PROFONT_7_POINT,
    PROFONT_9_POINT,
    PROFONT_10_POINT,
    PROFONT_12_POINT,
    PROFONT_14_POINT,
    PROFONT_18_POINT,
    PROFONT_24_POINT,
};

// =============================================================================
// Text Alignment Styles (const - zero runtime cost)
// =============================================================================

/// Centered horizontally and vertically on the anchor point.
pub const CENTERED: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Center)
    .baseline(Baseline::Middle)
    .build();

// =============================================================================
// Font Tables
// =============================================================================

/// ProFont sizes by point size.
const PROFONT_SIZES: [(u32, &MonoFont<'static>); 7] = [
    (7, &PROFONT_7_POINT),
    (9, &PROFONT_9_POINT),
    (10, &PROFONT_10_POINT),
    (12, &PROFONT_12_POINT),
    (14, &PROFONT_14_POINT),
    (18, &PROFONT_18_POINT),
    (24, &PROFONT_24_POINT),
];

/// Built-in mono fonts by glyph height.
const MONO_SIZES: [(u32, &MonoFont<'static>); 9] = [
    (6, &FONT_4X6),
    (8, &FONT_5X8),
    (10, &FONT_6X10),
    (13, &FONT_6X13),
    (14, &FONT_7X14),
    (13, &FONT_8X13),
    (15, &FONT_9X15),
    (18, &FONT_9X18),
    (20, &FONT_10X20),
];

/// Font for a banner's `font` and `font_size` settings.
///
/// Unknown families fall back to ProFont; sizes pick the nearest entry,
/// preferring the smaller font on ties.
pub fn banner_font(
    family: &str,
    size: u32,
) -> &'static MonoFont<'static> {
    let table: &[(u32, &'static MonoFont<'static>)] = if family.eq_ignore_ascii_case("mono") {
        &MONO_SIZES
    } else {
        &PROFONT_SIZES
    };

    table
        .iter()
        .min_by_key(|(points, _)| points.abs_diff(size))
        .map_or(&PROFONT_12_POINT, |(_, font)| *font)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same(
        a: &MonoFont<'static>,
        b: &MonoFont<'static>,
    ) -> bool {
        a.character_size == b.character_size && a.baseline == b.baseline
    }

    #[test]
    fn test_exact_profont_sizes() {
        assert!(same(banner_font("profont", 24), &PROFONT_24_POINT));
        assert!(same(banner_font("profont", 7), &PROFONT_7_POINT));
    }

    #[test]
    fn test_nearest_size() {
        assert!(same(banner_font("profont", 100), &PROFONT_24_POINT));
        assert!(same(banner_font("profont", 16), &PROFONT_14_POINT));
        assert!(same(banner_font("mono", 19), &FONT_9X18));
    }

    #[test]
    fn test_unknown_family_uses_profont() {
        assert!(same(banner_font("DejaVuSans.ttf", 18), &PROFONT_18_POINT));
    }
}
