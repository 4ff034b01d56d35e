//! Neon eye: a glowing sprite whose color follows the horizontal sweep.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use super::{Placed, fill_frame, size_option};
use crate::assets::{ImageProvider, Scaled};
use crate::colors::{blend, composite, to_rgb565};
use crate::curves::map_range;
use crate::motion::EyePosition;
use crate::settings::{MotionSettings, SkinView};

/// Style used when the skin has no `style` option.
const DEFAULT_STYLE: &str = "ring";

/// Horizontal sweep progress in percent, `0` at the left point, `100` at the right.
pub fn neon_progress(
    eye: EyePosition,
    motions: &MotionSettings,
) -> f32 {
    map_range(eye.x, motions.left_point.x as f32, motions.right_point.x as f32, 0.0, 100.0).clamp(0.0, 100.0)
}

/// Draw the neon skin.
///
/// The sprite keeps its alpha; its color is replaced by the blend of
/// `fg_color_start` and `fg_color_end` at the current sweep progress.
/// An unknown style renders the background only.
pub fn draw_neon<D, A>(
    target: &mut D,
    eye: EyePosition,
    skin: &SkinView<'_>,
    motions: &MotionSettings,
    assets: &A,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
    A: ImageProvider + ?Sized,
{
    let bg = skin.color("bg_color");
    let style = skin.text("style").unwrap_or(DEFAULT_STYLE);
    let Some(sprite) = assets.neon(style) else {
        return target.clear(to_rgb565(bg));
    };

    let tone = blend(
        skin.color("fg_color_start"),
        skin.color("fg_color_end"),
        neon_progress(eye, motions) / 100.0,
    );
    let iris_size = size_option(skin.int("iris_size", 150));
    let iris = Placed::centered(Scaled::new(sprite, Size::new(iris_size, iris_size)), eye.to_point());

    fill_frame(target, |p| match iris.sample(p) {
        Some(px) => composite(bg, tone, px.alpha),
        None => bg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ProceduralAssets;
    use crate::commands::handle_line;
    use crate::settings::Settings;
    use crate::skins::testing::{at, frame, target};

    const PANEL: Size = Size::new(240, 240);

    #[test]
    fn test_progress_clamps() {
        let motions = Settings::default().motions;
        let left = motions.left_point.x as f32;
        let right = motions.right_point.x as f32;
        assert_eq!(neon_progress(EyePosition::new(left, 120.0), &motions), 0.0);
        assert_eq!(neon_progress(EyePosition::new(right, 120.0), &motions), 100.0);
        assert_eq!(neon_progress(EyePosition::new(0.0, 120.0), &motions), 0.0);
        assert_eq!(neon_progress(EyePosition::new(239.0, 120.0), &motions), 100.0);
    }

    #[test]
    fn test_progress_degenerate_endpoints() {
        let mut motions = Settings::default().motions;
        motions.right_point = motions.left_point;
        assert_eq!(neon_progress(EyePosition::new(200.0, 120.0), &motions), 0.0);
    }

    #[test]
    fn test_ring_color_follows_sweep() {
        let assets = ProceduralAssets::new(PANEL);
        let mut settings = Settings::default();
        handle_line(&mut settings, "setSkinOption=neon:fg_color_start:#ff0000").unwrap();
        handle_line(&mut settings, "setSkinOption=neon:fg_color_end:#0000ff").unwrap();
        handle_line(&mut settings, "setSkinOption=neon:iris_size:128").unwrap();

        let motions = settings.motions;
        let left = EyePosition::new(motions.left_point.x as f32, 120.0);
        let right = EyePosition::new(motions.right_point.x as f32, 120.0);

        // Sample on the ring, 0.78 of the radius to the right of center
        let ring_offset = 50;

        let mut buf = frame();
        let mut fb = target(&mut buf);
        draw_neon(&mut fb, left, &settings.skin("neon"), &motions, &assets).unwrap();
        assert_eq!(at(&fb, left.x as u32 + ring_offset, 120), Rgb565::RED);
        assert_eq!(at(&fb, left.x as u32, 120), Rgb565::BLACK);

        draw_neon(&mut fb, right, &settings.skin("neon"), &motions, &assets).unwrap();
        assert_eq!(at(&fb, right.x as u32 + ring_offset, 120), Rgb565::BLUE);
    }

    #[test]
    fn test_unknown_style_is_background_only() {
        let assets = ProceduralAssets::new(PANEL);
        let mut settings = Settings::default();
        handle_line(&mut settings, "setSkinOption=neon:style:missing.png").unwrap();
        handle_line(&mut settings, "setSkinOption=neon:bg_color:#00ff00").unwrap();

        let mut buf = frame();
        let mut fb = target(&mut buf);
        let eye = EyePosition::new(120.0, 120.0);
        draw_neon(&mut fb, eye, &settings.skin("neon"), &settings.motions, &assets).unwrap();
        assert_eq!(at(&fb, 120, 120), Rgb565::GREEN);
        assert_eq!(at(&fb, 170, 120), Rgb565::GREEN);
    }
}
