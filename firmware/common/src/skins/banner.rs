//! Text banners: the flashing error banner and the static loading banner.

use core::fmt::Write as _;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;
use heapless::String;

use crate::colors::{color_or_black, to_rgb565};
use crate::settings::{BannerFormat, ErrorFormat};
use crate::styles::{CENTERED, banner_font};

/// Longest banner line after substitution.
const BANNER_TEXT_LEN: usize = 48;

/// Replace every `{}` in the error template with the code.
pub fn format_error_text(
    template: &str,
    code: u32,
) -> String<BANNER_TEXT_LEN> {
    let mut out = String::new();
    let mut parts = template.split("{}");
    if let Some(first) = parts.next() {
        out.push_str(first).ok();
    }
    for part in parts {
        write!(out, "{code}{part}").ok();
    }
    out
}

/// Outer fill, inset rectangle in the background color, centered text.
fn draw_framed<D>(
    target: &mut D,
    format: &BannerFormat,
    frame_color: Rgb565,
    text: &str,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let area = target.bounding_box();
    let fg = to_rgb565(color_or_black(&format.color));
    let bg = to_rgb565(color_or_black(&format.bg_color));

    target.clear(frame_color)?;

    let inset = format.border.min(area.size.width / 2).min(area.size.height / 2);
    let inner = Rectangle::new(
        area.top_left + Point::new(inset as i32, inset as i32),
        Size::new(area.size.width - 2 * inset, area.size.height - 2 * inset),
    );
    inner.into_styled(PrimitiveStyle::with_fill(bg)).draw(target)?;

    let style = MonoTextStyle::new(banner_font(&format.font, format.font_size), fg);
    Text::with_text_style(text, area.center(), style, CENTERED).draw(target)?;
    Ok(())
}

/// Static loading banner shown while waiting for the handshake.
pub fn draw_loading<D>(
    target: &mut D,
    format: &BannerFormat,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let frame_color = to_rgb565(color_or_black(&format.color));
    draw_framed(target, format, frame_color, &format.text)
}

/// Flashing error banner. The border toggles on every drawn frame.
#[derive(Clone, Copy, Debug)]
pub struct ErrorBanner {
    border_visible: bool,
}

impl Default for ErrorBanner {
    fn default() -> Self { Self::new() }
}

impl ErrorBanner {
    pub const fn new() -> Self { Self { border_visible: true } }

    /// Whether the last drawn frame showed the border.
    #[inline]
    pub const fn border_visible(&self) -> bool { self.border_visible }

    pub fn draw<D>(
        &mut self,
        target: &mut D,
        format: &ErrorFormat,
        code: u32,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        self.border_visible = !self.border_visible;
        let banner = &format.banner;
        let frame_color = if self.border_visible { &banner.color } else { &banner.bg_color };
        let text = format_error_text(&banner.text, code);
        draw_framed(target, banner, to_rgb565(color_or_black(frame_color)), &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::skins::testing::{at, frame, target};

    #[test]
    fn test_format_error_text() {
        assert_eq!(format_error_text("ERROR {}", 42).as_str(), "ERROR 42");
        assert_eq!(format_error_text("{}-{}", 7).as_str(), "7-7");
        assert_eq!(format_error_text("no code", 7).as_str(), "no code");
    }

    #[test]
    fn test_error_border_flashes() {
        let settings = Settings::default();
        let mut banner = ErrorBanner::new();
        let mut buf = frame();

        banner.draw(&mut target(&mut buf), &settings.error_format, 3).unwrap();
        let first_visible = banner.border_visible();
        let first_corner = at(&target(&mut buf), 0, 0);

        banner.draw(&mut target(&mut buf), &settings.error_format, 3).unwrap();
        assert_ne!(banner.border_visible(), first_visible);
        let second_corner = at(&target(&mut buf), 0, 0);

        let corners = [first_corner, second_corner];
        assert!(corners.contains(&Rgb565::BLACK) && corners.contains(&Rgb565::RED));
    }

    #[test]
    fn test_inner_area_is_background() {
        let settings = Settings::default();
        let mut buf = frame();
        let mut fb = target(&mut buf);
        draw_loading(&mut fb, &settings.loading_format).unwrap();
        // Border 6 in the text color, inner area in the background color
        assert_eq!(at(&fb, 2, 2), Rgb565::WHITE);
        assert_eq!(at(&fb, 10, 10), Rgb565::BLACK);
    }

    #[test]
    fn test_huge_border_does_not_underflow() {
        let mut format = Settings::default().loading_format;
        format.border = 10_000;
        let mut buf = frame();
        draw_loading(&mut target(&mut buf), &format).unwrap();
    }
}
