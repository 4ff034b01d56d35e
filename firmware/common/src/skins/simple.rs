//! Simple geometric eye: flat background, iris disc, pupil disc.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle};

use super::size_option;
use crate::colors::to_rgb565;
use crate::motion::EyePosition;
use crate::settings::SkinView;

pub fn draw_simple<D>(
    target: &mut D,
    eye: EyePosition,
    skin: &SkinView<'_>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let center = eye.to_point();
    // Read-only offset of the pupil from the iris center
    let pupil_offset = skin.point("pupil_offset").unwrap_or_default();

    target.clear(to_rgb565(skin.color("bg_color")))?;

    Circle::with_center(center, size_option(skin.int("iris_size", 100)))
        .into_styled(PrimitiveStyle::with_fill(to_rgb565(skin.color("iris_color"))))
        .draw(target)?;

    Circle::with_center(center + pupil_offset, size_option(skin.int("pupil_size", 40)))
        .into_styled(PrimitiveStyle::with_fill(to_rgb565(skin.color("pupil_color"))))
        .draw(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::handle_line;
    use crate::settings::Settings;
    use crate::skins::testing::{at, frame, target};

    #[test]
    fn test_draws_iris_and_pupil() {
        let mut settings = Settings::default();
        handle_line(&mut settings, "setSkinOption=simple:bg_color:#ffffff").unwrap();
        handle_line(&mut settings, "setSkinOption=simple:iris_color:#0000ff").unwrap();
        handle_line(&mut settings, "setSkinOption=simple:pupil_color:#000000").unwrap();

        let mut buf = frame();
        let mut fb = target(&mut buf);
        draw_simple(&mut fb, EyePosition::new(100.0, 120.0), &settings.skin("simple")).unwrap();

        assert_eq!(at(&fb, 0, 0), Rgb565::WHITE);
        assert_eq!(at(&fb, 100, 120), Rgb565::BLACK);
        // Inside the iris (size 110) but outside the pupil (size 44)
        assert_eq!(at(&fb, 140, 120), Rgb565::BLUE);
        assert_eq!(at(&fb, 170, 120), Rgb565::WHITE);
    }

    #[test]
    fn test_bad_color_renders_black() {
        let mut settings = Settings::default();
        handle_line(&mut settings, "setSkinOption=simple:bg_color:notacolor").unwrap();

        let mut buf = frame();
        let mut fb = target(&mut buf);
        draw_simple(&mut fb, EyePosition::new(120.0, 120.0), &settings.skin("simple")).unwrap();
        assert_eq!(at(&fb, 0, 0), Rgb565::BLACK);
    }
}
