//! Desktop window showing both eyes side by side.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics_simulator::sdl2::Keycode;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use eyes_common::config::{MAX_BACKLIGHT, SCREEN_HEIGHT, SCREEN_WIDTH};
use eyes_common::{FrameSink, MotionMode, Settings};

/// Horizontal gap between the two panels, in panel pixels.
const GAP: u32 = 16;

/// Both panels in one window. Each pushed frame goes to both halves.
pub struct EyeWindow {
    display: SimulatorDisplay<Rgb565>,
    window: Window,
    backlight: u8,
}

impl EyeWindow {
    pub fn new(
        scale: u32,
        backlight: u8,
    ) -> Self {
        let mut display = SimulatorDisplay::new(Size::new(SCREEN_WIDTH * 2 + GAP, SCREEN_HEIGHT));
        let output_settings = OutputSettingsBuilder::new().scale(scale).build();
        let mut window = Window::new("Robot Eyes", &output_settings);

        display.clear(Rgb565::BLACK).ok();
        window.update(&display);

        Self {
            display,
            window,
            backlight,
        }
    }

    pub fn set_backlight(
        &mut self,
        percent: u8,
    ) {
        self.backlight = percent.min(MAX_BACKLIGHT);
    }

    /// Drain pending window events.
    pub fn events(&mut self) -> impl Iterator<Item = SimulatorEvent> + '_ { self.window.events() }

    fn panel(index: u32) -> Rectangle {
        Rectangle::new(
            Point::new((index * (SCREEN_WIDTH + GAP)) as i32, 0),
            Size::new(SCREEN_WIDTH, SCREEN_HEIGHT),
        )
    }
}

impl FrameSink for EyeWindow {
    type Error = Infallible;

    fn push(
        &mut self,
        frame: &[u8],
    ) -> Result<(), Self::Error> {
        let backlight = self.backlight;
        for index in 0..2 {
            let pixels = frame.chunks_exact(2).map(|bytes| dim(decode_pixel([bytes[0], bytes[1]]), backlight));
            self.display.fill_contiguous(&Self::panel(index), pixels)?;
        }
        self.window.update(&self.display);
        Ok(())
    }
}

/// Big-endian RGB565 bytes back to a color.
fn decode_pixel(bytes: [u8; 2]) -> Rgb565 { RawU16::new(u16::from_be_bytes(bytes)).into() }

/// Scale a color by the backlight percentage.
fn dim(
    color: Rgb565,
    percent: u8,
) -> Rgb565 {
    let scale = |channel: u8| (u16::from(channel) * u16::from(percent) / u16::from(MAX_BACKLIGHT)) as u8;
    Rgb565::new(scale(color.r()), scale(color.g()), scale(color.b()))
}

/// Command line bound to a key, if any.
///
/// `H` completes the handshake, `1`..`5` pick a page and `M` cycles the motion mode.
pub fn key_command(
    keycode: Keycode,
    settings: &Settings,
) -> Option<String> {
    let page = match keycode {
        Keycode::H => return Some("handshake.complete".into()),
        Keycode::M => {
            let next = (settings.states.motion.index() + 1) % MotionMode::ALL.len() as u32;
            return Some(format!("setMotion={next}"));
        }
        Keycode::Num1 => 1,
        Keycode::Num2 => 2,
        Keycode::Num3 => 3,
        Keycode::Num4 => 4,
        Keycode::Num5 => 5,
        _ => return None,
    };
    Some(format!("setState={page}"))
}
