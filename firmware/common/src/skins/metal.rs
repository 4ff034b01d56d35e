//! Metallic eye: brushed aluminum background with a hue-tinted iris sprite.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use super::{Placed, fill_frame, size_option};
use crate::assets::{ImageProvider, Scaled, Sprite};
use crate::colors::{composite, shift_hue};
use crate::motion::EyePosition;
use crate::settings::SkinView;

/// Draw the metallic skin.
///
/// The iris sprite is scaled to `iris_size`, its hue rotated by `tint`
/// steps of 256, and composited over the aluminum using its own alpha.
pub fn draw_metal<D, A>(
    target: &mut D,
    eye: EyePosition,
    skin: &SkinView<'_>,
    assets: &A,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
    A: ImageProvider + ?Sized,
{
    let panel = target.bounding_box().size;
    let base = skin.color("bg_color");
    let tint = skin.int("tint", 0);
    let iris_size = size_option(skin.int("iris_size", 120));

    let background = Scaled::new(assets.aluminum(), panel);
    let iris = Placed::centered(
        Scaled::new(assets.metal_iris(), Size::new(iris_size, iris_size)),
        eye.to_point(),
    );

    fill_frame(target, |p| {
        let metal = background.pixel(p.x as u32, p.y as u32);
        let bg = composite(base, metal.color, metal.alpha);
        match iris.sample(p) {
            Some(px) => composite(bg, shift_hue(px.color, tint), px.alpha),
            None => bg,
        }
    })
}

#[cfg(test)]
mod tests {
    use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

    use super::*;
    use crate::assets::ProceduralAssets;
    use crate::colors::to_rgb565;
    use crate::commands::handle_line;
    use crate::settings::Settings;
    use crate::skins::testing::{at, frame, target};

    const PANEL: Size = Size::new(240, 240);

    #[test]
    fn test_background_is_aluminum_outside_iris() {
        let assets = ProceduralAssets::new(PANEL);
        let settings = Settings::default();
        let mut buf = frame();
        let mut fb = target(&mut buf);
        draw_metal(&mut fb, EyePosition::new(120.0, 120.0), &settings.skin("metal"), &assets).unwrap();

        let expected = to_rgb565(assets.aluminum().pixel(3, 5).color);
        assert_eq!(at(&fb, 3, 5), expected);
    }

    #[test]
    fn test_tint_changes_iris_only() {
        let assets = ProceduralAssets::new(PANEL);
        let mut settings = Settings::default();
        let eye = EyePosition::new(120.0, 120.0);

        let mut plain = frame();
        draw_metal(&mut target(&mut plain), eye, &settings.skin("metal"), &assets).unwrap();

        handle_line(&mut settings, "setSkinOption=metal:tint:128").unwrap();
        let mut tinted = frame();
        draw_metal(&mut target(&mut tinted), eye, &settings.skin("metal"), &assets).unwrap();

        let plain_fb = target(&mut plain);
        let tinted_fb = target(&mut tinted);
        assert_eq!(at(&plain_fb, 0, 0), at(&tinted_fb, 0, 0));

        // A fibre pixel between pupil and rim turns from blue toward orange
        let before = at(&plain_fb, 120 + 35, 120);
        let after = at(&tinted_fb, 120 + 35, 120);
        assert_ne!(before, after);
        assert!(Rgb888::from(after).r() > Rgb888::from(before).r());
    }
}
