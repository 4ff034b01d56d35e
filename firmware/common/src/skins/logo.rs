//! Startup logo.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;

use super::{Placed, fill_frame};
use crate::assets::ImageProvider;
use crate::colors::{color_or_black, composite, to_rgb565};
use crate::settings::LogoFormat;
use crate::styles::{CENTERED, banner_font};

/// Gap between the emblem and the caption.
const CAPTION_GAP: i32 = 16;

/// Draw the logo emblem in `color` over `bg_color`, with the caption below it.
pub fn draw_logo<D, A>(
    target: &mut D,
    format: &LogoFormat,
    assets: &A,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
    A: ImageProvider + ?Sized,
{
    let area = target.bounding_box();
    let bg = color_or_black(&format.bg_color);
    let fg = color_or_black(&format.color);

    let emblem = assets.logo();
    let emblem_height = emblem.size().height as i32;
    let has_caption = !format.text.is_empty();
    let center = if has_caption {
        area.center() - Point::new(0, CAPTION_GAP)
    } else {
        area.center()
    };
    let placed = Placed::centered(emblem, center);

    fill_frame(target, |p| match placed.sample(p) {
        Some(px) => composite(bg, fg, px.alpha),
        None => bg,
    })?;

    if has_caption {
        let style = MonoTextStyle::new(banner_font(&format.font, format.font_size), to_rgb565(fg));
        let anchor = center + Point::new(0, emblem_height / 2 + CAPTION_GAP);
        Text::with_text_style(&format.text, anchor, style, CENTERED).draw(target)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ProceduralAssets;
    use crate::settings::Settings;
    use crate::skins::testing::{at, frame, target};

    #[test]
    fn test_logo_background_and_ring() {
        let assets = ProceduralAssets::new(Size::new(240, 240));
        let format = Settings::default().logo_format;
        let mut buf = frame();
        let mut fb = target(&mut buf);
        draw_logo(&mut fb, &format, &assets).unwrap();

        assert_eq!(at(&fb, 0, 0), Rgb565::BLACK);
        // Emblem ring at 0.85 of its 48 px radius, left of the raised center (119, 103)
        assert_eq!(at(&fb, 119 - 40, 104), Rgb565::WHITE);
    }
}
